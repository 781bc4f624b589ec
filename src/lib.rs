//! # doorlink
//!
//! Bridges a physical door lock and reed sensor to an MQTT broker from a
//! Raspberry Pi. Remote `lock`/`unlock` commands arrive on a command topic
//! and drive the actuator pin; door position is sampled from the sensor pin
//! and reported upstream as a retained status message plus lifecycle events.
//!
//! ```text
//! broker ──cmd──▶ ┌─────────────┐ ──▶ actuator pin
//!                 │ control loop │
//! broker ◀status─ └─────────────┘ ◀── sensor pin
//! ```
//!
//! Everything runs on one thread: the loop maintains the broker session,
//! drains inbound commands, samples the sensor and decides whether to
//! publish. Hardware and transport sit behind small traits so the whole
//! bridge can be exercised on a host without a Pi or a broker.

pub mod bridge;
pub mod config;
pub mod hardware;
pub mod mqtt;
