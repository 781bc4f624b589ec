//! Broker session state machine.
//!
//! Wraps a rumqttc client/connection pair behind the [`Transport`] trait.
//! The session moves `Disconnected -> Connecting -> Connected` and falls
//! back to `Disconnected` on any send or receive failure; the control loop
//! decides when to dial again. rumqttc does not restore subscriptions on
//! reconnect, so every successful [`connect`](MqttSession::connect)
//! re-subscribes to the command topic.

use std::time::{Duration, Instant};

use rumqttc::{
    Client, Connection, ConnectReturnCode, Event, MqttOptions, Packet, QoS, RecvTimeoutError,
    TryRecvError,
};
use tracing::{debug, info, warn};

use super::config::MqttConfig;
use super::messages::InboundMessage;

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Broker refused the session: {0}")]
    Refused(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Connect attempt timed out")]
    Timeout,

    #[error("Event channel closed")]
    ChannelClosed,

    #[error("Subscribe failed: {0}")]
    Subscribe(String),
}

/// The transport seam the bridge is written against. [`MqttSession`] is the
/// production implementation; tests drive the loop with an in-memory mock.
pub trait Transport {
    fn is_connected(&self) -> bool;

    /// One connection attempt: establish the session and re-subscribe to
    /// the command topic. Leaves the session `Disconnected` on failure.
    fn connect(&mut self) -> Result<(), SessionError>;

    /// Best-effort send. Failures are logged and swallowed; the next state
    /// change or heartbeat will carry fresh data anyway.
    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool);

    /// Drain messages received since the last call. Non-blocking, finite.
    fn poll_inbound(&mut self) -> Vec<InboundMessage>;
}

pub struct MqttSession {
    client: Client,
    connection: Connection,
    config: MqttConfig,
    connect_timeout: Duration,
    state: ConnectionState,
    messages_received: usize,
    messages_sent: usize,
}

impl MqttSession {
    pub fn new(config: MqttConfig, connect_timeout: Duration) -> Self {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        if let (Some(user), Some(pw)) = (&config.username, &config.password) {
            options.set_credentials(user.clone(), pw.clone());
        }

        let (client, connection) = Client::new(options, 64);

        Self {
            client,
            connection,
            config,
            connect_timeout,
            state: ConnectionState::Disconnected,
            messages_received: 0,
            messages_sent: 0,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    fn mark_disconnected(&mut self, reason: &str) {
        if self.state != ConnectionState::Disconnected {
            warn!("Broker session lost: {}", reason);
        }
        self.state = ConnectionState::Disconnected;
    }
}

impl Transport for MqttSession {
    fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    fn connect(&mut self) -> Result<(), SessionError> {
        self.state = ConnectionState::Connecting;
        info!(
            "Connecting to broker {}:{} as {}",
            self.config.broker_host, self.config.broker_port, self.config.client_id
        );

        // Drive the event loop until the broker acknowledges the session or
        // the attempt fails. Everything else seen on the way (outgoing
        // echoes, pings) is irrelevant here.
        let deadline = Instant::now() + self.connect_timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.state = ConnectionState::Disconnected;
                return Err(SessionError::Timeout);
            }

            match self.connection.recv_timeout(remaining) {
                Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                    if ack.code != ConnectReturnCode::Success {
                        self.state = ConnectionState::Disconnected;
                        return Err(SessionError::Refused(format!("{:?}", ack.code)));
                    }
                    self.client
                        .subscribe(self.config.topics.command.clone(), QoS::AtMostOnce)
                        .map_err(|e| {
                            self.state = ConnectionState::Disconnected;
                            SessionError::Subscribe(e.to_string())
                        })?;
                    self.state = ConnectionState::Connected;
                    info!("Broker session established, subscribed to {}", self.config.topics.command);
                    return Ok(());
                }
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => {
                    self.state = ConnectionState::Disconnected;
                    return Err(SessionError::Connection(e.to_string()));
                }
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    self.state = ConnectionState::Disconnected;
                    return Err(SessionError::ChannelClosed);
                }
            }
        }
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool) {
        match self
            .client
            .try_publish(topic, QoS::AtMostOnce, retained, payload)
        {
            Ok(()) => {
                self.messages_sent += 1;
                debug!("Published to {} ({} total)", topic, self.messages_sent);
            }
            Err(e) => {
                warn!("Publish to {} failed, dropping: {}", topic, e);
                self.mark_disconnected("publish failure");
            }
        }
    }

    fn poll_inbound(&mut self) -> Vec<InboundMessage> {
        let mut inbound = Vec::new();
        loop {
            match self.connection.try_recv() {
                Ok(Ok(Event::Incoming(Packet::Publish(publish)))) => {
                    self.messages_received += 1;
                    debug!(
                        "Received message on {} ({} total)",
                        publish.topic, self.messages_received
                    );
                    inbound.push(InboundMessage::new(publish.topic, publish.payload.to_vec()));
                }
                Ok(Ok(Event::Incoming(Packet::Disconnect))) => {
                    self.mark_disconnected("broker sent disconnect");
                    break;
                }
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => {
                    self.mark_disconnected(&e.to_string());
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.mark_disconnected("event channel closed");
                    break;
                }
            }
        }
        inbound
    }
}
