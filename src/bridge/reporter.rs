//! Door status reporting.
//!
//! Publishes are edge-triggered on a change in the sampled door state, with
//! a heartbeat publish when nothing has changed for a full interval so
//! subscribers can tell a quiet device from a stuck one.

use std::time::{Duration, Instant};

use tracing::info;

use crate::hardware::DoorState;
use crate::mqtt::messages::{unix_timestamp, StatusMessage};
use crate::mqtt::Transport;

pub struct StateReporter {
    device_id: String,
    status_topic: String,
    heartbeat_interval: Duration,
    last_published: Option<DoorState>,
    last_publish_time: Option<Instant>,
}

impl StateReporter {
    pub fn new(device_id: String, status_topic: String, heartbeat_interval: Duration) -> Self {
        Self {
            device_id,
            status_topic,
            heartbeat_interval,
            last_published: None,
            last_publish_time: None,
        }
    }

    /// Publish a retained status if the state changed since the last
    /// publish, or if the heartbeat interval has elapsed. Tracking fields
    /// update after any publish, whether or not the send got through.
    pub fn maybe_report<T: Transport>(
        &mut self,
        current: DoorState,
        now: Instant,
        transport: &mut T,
    ) {
        let edge = self.last_published != Some(current);
        let heartbeat_due = match self.last_publish_time {
            Some(last) => now.duration_since(last) >= self.heartbeat_interval,
            None => true,
        };

        if !edge && !heartbeat_due {
            return;
        }

        if edge {
            info!("Door state changed to {}", current.as_str());
        }

        let status = StatusMessage::new(&self.device_id, current, unix_timestamp());
        transport.publish(&self.status_topic, status.to_json().as_bytes(), true);
        self.last_published = Some(current);
        self.last_publish_time = Some(now);
    }
}
