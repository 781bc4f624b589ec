//! The top-level cooperative loop.
//!
//! One iteration per tick: make sure the broker session is up, drain and
//! dispatch inbound commands, sample the door sensor, let the reporter
//! decide whether to publish, then sleep out the tick. There is no shutdown
//! path; the process runs until power loss.

use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::BridgeConfig;
use crate::hardware::{ActuatorPin, DoorSensor, LockDriver, SensorPin};
use crate::mqtt::messages::{unix_timestamp, EventMessage};
use crate::mqtt::Transport;

use super::command::CommandInterpreter;
use super::reporter::StateReporter;

pub struct ControlLoop<T, P, S>
where
    T: Transport,
    P: ActuatorPin,
    S: SensorPin,
{
    transport: T,
    lock: LockDriver<P>,
    sensor: DoorSensor<S>,
    interpreter: CommandInterpreter,
    reporter: StateReporter,
    device_id: String,
    event_topic: String,
    reconnect_delay: Duration,
    tick_interval: Duration,
}

impl<T, P, S> ControlLoop<T, P, S>
where
    T: Transport,
    P: ActuatorPin,
    S: SensorPin,
{
    pub fn new(config: &BridgeConfig, transport: T, lock: LockDriver<P>, sensor: DoorSensor<S>) -> Self {
        let interpreter = CommandInterpreter::new(
            config.device_id.clone(),
            config.mqtt.topics.command.clone(),
            config.mqtt.topics.event.clone(),
            config.timing.pulse(),
        );
        let reporter = StateReporter::new(
            config.device_id.clone(),
            config.mqtt.topics.status.clone(),
            config.timing.heartbeat(),
        );

        Self {
            transport,
            lock,
            sensor,
            interpreter,
            reporter,
            device_id: config.device_id.clone(),
            event_topic: config.mqtt.topics.event.clone(),
            reconnect_delay: config.timing.reconnect_delay(),
            tick_interval: config.timing.tick(),
        }
    }

    /// Run forever. Each iteration handles connectivity, commands and
    /// reporting, then sleeps one tick so the network layer gets a turn.
    pub fn run(mut self) -> ! {
        info!(
            "Control loop started, tick interval {:?}",
            self.tick_interval
        );
        loop {
            self.tick(Instant::now());
            thread::sleep(self.tick_interval);
        }
    }

    /// One loop iteration. Split out from [`run`](Self::run) so tests can
    /// step the loop with a synthetic clock.
    pub fn tick(&mut self, now: Instant) {
        self.ensure_connected();

        for message in self.transport.poll_inbound() {
            self.interpreter
                .dispatch(&message, &mut self.lock, &mut self.transport);
        }

        let state = self.sensor.read();
        self.reporter.maybe_report(state, now, &mut self.transport);
    }

    /// Block until the transport is connected, retrying at a fixed delay
    /// with no upper bound. While this spins, nothing else runs; commands
    /// and sensor reporting resume only once the session is back. On
    /// success, announce the device before resuming.
    fn ensure_connected(&mut self) {
        if self.transport.is_connected() {
            return;
        }

        loop {
            match self.transport.connect() {
                Ok(()) => break,
                Err(e) => {
                    warn!("Connect attempt failed: {}, retrying in {:?}", e, self.reconnect_delay);
                    thread::sleep(self.reconnect_delay);
                }
            }
        }

        let online = EventMessage::new(&self.device_id, "device_online", unix_timestamp());
        self.transport
            .publish(&self.event_topic, online.to_json().as_bytes(), false);
    }
}
