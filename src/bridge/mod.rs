//! # Bridge Module
//!
//! The reconciliation core between the broker and the physical door:
//!
//! ```text
//! bridge/
//! ├── command.rs      - decode inbound payloads, drive the actuator
//! ├── reporter.rs     - edge-triggered + heartbeat status publishing
//! └── control_loop.rs - the single-threaded tick loop tying it together
//! ```
//!
//! All three parts are generic over the transport and pin traits, so the
//! complete loop runs against mocks in tests exactly as it runs against
//! rumqttc and rppal in production.

pub mod command;
pub mod control_loop;
pub mod reporter;

pub use command::{interpret, Command, CommandInterpreter};
pub use control_loop::ControlLoop;
pub use reporter::StateReporter;
