//! Message types crossing the broker boundary.

use serde::Serialize;
use std::fmt;
use tracing::warn;

use crate::hardware::DoorState;

/// A message received from the broker, as raw bytes plus its topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl InboundMessage {
    pub fn new(topic: String, payload: Vec<u8>) -> Self {
        Self { topic, payload }
    }
}

impl fmt::Display for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} ({} bytes): {}",
            self.topic,
            self.payload.len(),
            String::from_utf8_lossy(&self.payload)
        )
    }
}

/// Retained door status, `{"device":...,"door":"open"|"closed","timestamp":...}`.
#[derive(Debug, Serialize)]
pub struct StatusMessage<'a> {
    device: &'a str,
    door: &'static str,
    timestamp: u64,
}

impl<'a> StatusMessage<'a> {
    pub fn new(device: &'a str, door: DoorState, timestamp: u64) -> Self {
        Self {
            device,
            door: door.as_str(),
            timestamp,
        }
    }

    pub fn to_json(&self) -> String {
        encode(self)
    }
}

/// Lifecycle event, `{"device":...,"event":"<tag>","timestamp":...}`.
#[derive(Debug, Serialize)]
pub struct EventMessage<'a> {
    device: &'a str,
    event: &'a str,
    timestamp: u64,
}

impl<'a> EventMessage<'a> {
    pub fn new(device: &'a str, event: &'a str, timestamp: u64) -> Self {
        Self {
            device,
            event,
            timestamp,
        }
    }

    pub fn to_json(&self) -> String {
        encode(self)
    }
}

fn encode<T: Serialize>(message: &T) -> String {
    serde_json::to_string(message).unwrap_or_else(|e| {
        warn!("Failed to encode outbound payload: {}", e);
        String::new()
    })
}

/// Seconds since the Unix epoch, for outbound payload timestamps.
pub fn unix_timestamp() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}
