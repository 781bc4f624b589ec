//! Inbound command decoding and dispatch.

use std::time::Duration;

use tracing::{debug, info};

use crate::hardware::{ActuatorPin, LockDriver};
use crate::mqtt::messages::{unix_timestamp, EventMessage};
use crate::mqtt::{InboundMessage, Transport};

/// A decoded remote command. Constructed per message, consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Lock,
    Unlock,
    Unknown,
}

/// Decode a raw payload. Matching is ASCII case-insensitive after trimming
/// surrounding whitespace; anything unrecognized (including non-UTF-8) maps
/// to [`Command::Unknown`].
pub fn interpret(payload: &[u8]) -> Command {
    let text = match std::str::from_utf8(payload) {
        Ok(text) => text.trim(),
        Err(_) => return Command::Unknown,
    };

    if text.eq_ignore_ascii_case("lock") {
        Command::Lock
    } else if text.eq_ignore_ascii_case("unlock") {
        Command::Unlock
    } else {
        Command::Unknown
    }
}

/// Routes command-topic messages to the actuator and acknowledges each
/// executed command with an event publish. The event goes out after the
/// actuator call returns, so an `unlocked` event means the release pulse
/// has already completed.
pub struct CommandInterpreter {
    device_id: String,
    command_topic: String,
    event_topic: String,
    pulse_duration: Duration,
}

impl CommandInterpreter {
    pub fn new(
        device_id: String,
        command_topic: String,
        event_topic: String,
        pulse_duration: Duration,
    ) -> Self {
        Self {
            device_id,
            command_topic,
            event_topic,
            pulse_duration,
        }
    }

    pub fn dispatch<P: ActuatorPin, T: Transport>(
        &self,
        message: &InboundMessage,
        lock: &mut LockDriver<P>,
        transport: &mut T,
    ) {
        if message.topic != self.command_topic {
            debug!("Ignoring message on {}", message.topic);
            return;
        }

        match interpret(&message.payload) {
            Command::Lock => {
                info!("Remote lock command received");
                lock.set_locked(true);
                self.emit_event(transport, "locked");
            }
            Command::Unlock => {
                info!("Remote unlock command received");
                lock.pulse_unlock(self.pulse_duration);
                self.emit_event(transport, "unlocked");
            }
            Command::Unknown => {
                debug!("Ignoring unknown command payload: {}", message);
            }
        }
    }

    fn emit_event<T: Transport>(&self, transport: &mut T, tag: &str) {
        let event = EventMessage::new(&self.device_id, tag, unix_timestamp());
        transport.publish(&self.event_topic, event.to_json().as_bytes(), false);
    }
}
