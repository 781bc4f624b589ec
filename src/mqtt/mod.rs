//! # MQTT Transport Module
//!
//! Owns the broker session for the bridge: connection lifecycle, the
//! subscription to the command topic, and best-effort publishing of status
//! and event payloads.
//!
//! ```text
//! mqtt/
//! ├── config.rs    - broker address, credentials, topic names
//! ├── messages.rs  - inbound envelope and outbound JSON payloads
//! └── session.rs   - connection state machine over rumqttc
//! ```
//!
//! The session implements the [`Transport`](session::Transport) trait, which
//! is the seam the control loop is written against. Publishing is
//! fire-and-forget: a failed send is logged and dropped, and the next state
//! change or heartbeat carries fresh data upstream anyway.

pub mod config;
pub mod messages;
pub mod session;

pub use messages::InboundMessage;
pub use session::{ConnectionState, MqttSession, SessionError, Transport};
