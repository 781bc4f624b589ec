//! Bridge configuration loaded from a TOML file.
//!
//! The file lives at `<config dir>/doorlink/config.toml` unless a path is
//! given on the command line. A missing file is written out with defaults on
//! first start so there is always something on disk to edit.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::mqtt::config::MqttConfig;

const CONFIG_DIR: &str = "doorlink";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize default config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Top-level configuration. All values are static for the lifetime of the
/// process; there is no runtime reconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Device name used in status and event payloads.
    pub device_id: String,
    pub mqtt: MqttConfig,
    pub hardware: HardwareConfig,
    pub timing: TimingConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_id: "door1".to_string(),
            mqtt: MqttConfig::default(),
            hardware: HardwareConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// BCM pin assignments, matching the reference wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// Output pin driving the lock relay / solenoid.
    pub lock_pin: u8,
    /// Input pin wired to the reed switch (pull-up, high = closed).
    pub sensor_pin: u8,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            lock_pin: 23,
            sensor_pin: 22,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long the release coil stays energized on an unlock command.
    pub pulse_ms: u64,
    /// Maximum silence between status publishes while connected.
    pub heartbeat_ms: u64,
    /// Fixed wait between reconnect attempts. No backoff growth.
    pub reconnect_delay_ms: u64,
    /// Control loop tick interval.
    pub tick_ms: u64,
    /// Upper bound on a single connect attempt.
    pub connect_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pulse_ms: 700,
            heartbeat_ms: 5000,
            reconnect_delay_ms: 3000,
            tick_ms: 50,
            connect_timeout_ms: 10_000,
        }
    }
}

impl TimingConfig {
    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl BridgeConfig {
    /// Load configuration from `path`, or from the default location when no
    /// path is given. A missing file is created with default contents.
    pub fn load(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(default_config_path);
        if !path.exists() {
            info!("No config file at {}, writing defaults", path.display());
            let config = Self::default();
            config.write_to(&path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        let config: Self = toml::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn write_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_device() {
        let c = BridgeConfig::default();
        assert_eq!(c.device_id, "door1");
        assert_eq!(c.hardware.lock_pin, 23);
        assert_eq!(c.hardware.sensor_pin, 22);
        assert_eq!(c.timing.pulse_ms, 700);
        assert_eq!(c.timing.heartbeat_ms, 5000);
        assert_eq!(c.timing.tick_ms, 50);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let parsed: BridgeConfig = toml::from_str(
            r#"
            device_id = "garage"

            [timing]
            pulse_ms = 250
            "#,
        )
        .expect("partial config should parse");
        assert_eq!(parsed.device_id, "garage");
        assert_eq!(parsed.timing.pulse_ms, 250);
        // untouched sections keep their defaults
        assert_eq!(parsed.timing.heartbeat_ms, 5000);
        assert_eq!(parsed.hardware.lock_pin, 23);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = BridgeConfig::default();
        let text = toml::to_string_pretty(&config).expect("serialize");
        let back: BridgeConfig = toml::from_str(&text).expect("reparse");
        assert_eq!(back.device_id, config.device_id);
        assert_eq!(back.mqtt.broker_port, config.mqtt.broker_port);
        assert_eq!(
            back.timing.reconnect_delay_ms,
            config.timing.reconnect_delay_ms
        );
    }
}
