//! MQTT broker and topic configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub broker_host: String,
    pub broker_port: u16,
    /// Client identifier, unique per device on the broker.
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub keep_alive_secs: u64,
    pub topics: TopicConfig,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "test.mosquitto.org".to_string(),
            broker_port: 1883,
            client_id: "door1-bridge".to_string(),
            username: None,
            password: None,
            keep_alive_secs: 5,
            topics: TopicConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Inbound lock/unlock commands.
    pub command: String,
    /// Outbound retained door status.
    pub status: String,
    /// Outbound lifecycle events, not retained.
    pub event: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            command: "home/door1/cmd".to_string(),
            status: "home/door1/status".to_string(),
            event: "home/door1/event".to_string(),
        }
    }
}
