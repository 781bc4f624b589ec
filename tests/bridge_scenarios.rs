//! End-to-end scenarios against the public crate API, with in-memory
//! transport and pins standing in for the broker and the GPIO hardware.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use doorlink::bridge::ControlLoop;
use doorlink::config::BridgeConfig;
use doorlink::hardware::{ActuatorPin, DoorSensor, LockDriver, SensorPin};
use doorlink::mqtt::{InboundMessage, SessionError, Transport};

#[derive(Default)]
struct TransportState {
    connected: bool,
    connect_failures: usize,
    inbound: VecDeque<InboundMessage>,
    published: Vec<(String, String, bool)>,
}

/// Scriptable broker stand-in. State lives behind an `Rc` so the test keeps
/// a handle after the control loop takes ownership of the transport.
#[derive(Clone, Default)]
struct ScriptedTransport {
    state: Rc<RefCell<TransportState>>,
}

impl ScriptedTransport {
    fn push_command(&self, payload: &[u8]) {
        self.state.borrow_mut().inbound.push_back(InboundMessage::new(
            "home/door1/cmd".to_string(),
            payload.to_vec(),
        ));
    }

    fn drop_link(&self) {
        self.state.borrow_mut().connected = false;
    }

    fn payloads_on(&self, topic: &str) -> Vec<String> {
        self.state
            .borrow()
            .published
            .iter()
            .filter(|(t, _, _)| t == topic)
            .map(|(_, payload, _)| payload.clone())
            .collect()
    }
}

impl Transport for ScriptedTransport {
    fn is_connected(&self) -> bool {
        self.state.borrow().connected
    }

    fn connect(&mut self) -> Result<(), SessionError> {
        let mut state = self.state.borrow_mut();
        if state.connect_failures > 0 {
            state.connect_failures -= 1;
            return Err(SessionError::Timeout);
        }
        state.connected = true;
        Ok(())
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retained: bool) {
        self.state.borrow_mut().published.push((
            topic.to_string(),
            String::from_utf8_lossy(payload).to_string(),
            retained,
        ));
    }

    fn poll_inbound(&mut self) -> Vec<InboundMessage> {
        self.state.borrow_mut().inbound.drain(..).collect()
    }
}

#[derive(Clone)]
struct SharedPin {
    level: Rc<RefCell<bool>>,
    writes: Rc<RefCell<Vec<bool>>>,
}

impl SharedPin {
    fn new(level: bool) -> Self {
        Self {
            level: Rc::new(RefCell::new(level)),
            writes: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn set_level(&self, level: bool) {
        *self.level.borrow_mut() = level;
    }
}

impl ActuatorPin for SharedPin {
    fn set_high(&mut self) {
        *self.level.borrow_mut() = true;
        self.writes.borrow_mut().push(true);
    }

    fn set_low(&mut self) {
        *self.level.borrow_mut() = false;
        self.writes.borrow_mut().push(false);
    }
}

impl SensorPin for SharedPin {
    fn is_high(&mut self) -> bool {
        *self.level.borrow()
    }
}

fn test_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.timing.pulse_ms = 5;
    config.timing.reconnect_delay_ms = 1;
    config
}

fn build_bridge(
    transport: ScriptedTransport,
    door_closed: bool,
) -> (
    ControlLoop<ScriptedTransport, SharedPin, SharedPin>,
    SharedPin,
    SharedPin,
) {
    let config = test_config();
    let lock_pin = SharedPin::new(false);
    let reed_pin = SharedPin::new(door_closed);
    let lock = LockDriver::new(lock_pin.clone());
    let sensor = DoorSensor::new(reed_pin.clone());
    (
        ControlLoop::new(&config, transport, lock, sensor),
        lock_pin,
        reed_pin,
    )
}

#[test]
fn startup_publishes_online_event_and_retained_closed_status() {
    let transport = ScriptedTransport::default();
    let (mut bridge, _lock_pin, _reed_pin) = build_bridge(transport.clone(), true);

    bridge.tick(Instant::now());

    let events = transport.payloads_on("home/door1/event");
    assert_eq!(events.len(), 1);
    assert!(events[0].contains("\"event\":\"device_online\""));

    let state = transport.state.borrow();
    let status = state
        .published
        .iter()
        .find(|(topic, _, _)| topic == "home/door1/status")
        .expect("status published on first tick");
    assert!(status.1.contains("\"door\":\"closed\""));
    assert!(status.2, "status must be retained");
}

#[test]
fn unlock_command_drives_pulse_without_forcing_status() {
    let transport = ScriptedTransport::default();
    let (mut bridge, lock_pin, _reed_pin) = build_bridge(transport.clone(), true);
    let start = Instant::now();

    bridge.tick(start);
    transport.push_command(b"unlock");
    bridge.tick(start + Duration::from_millis(50));

    // release pulse went high then returned low
    assert_eq!(*lock_pin.writes.borrow(), vec![false, true, false]);
    assert!(!*lock_pin.level.borrow());

    let events = transport.payloads_on("home/door1/event");
    assert!(events.iter().any(|e| e.contains("\"event\":\"unlocked\"")));

    // the lock actuator does not move the reed sensor, so the only status
    // remains the startup edge publish
    assert_eq!(transport.payloads_on("home/door1/status").len(), 1);
}

#[test]
fn door_opening_publishes_edge_status() {
    let transport = ScriptedTransport::default();
    let (mut bridge, _lock_pin, reed_pin) = build_bridge(transport.clone(), true);
    let start = Instant::now();

    bridge.tick(start);
    reed_pin.set_level(false);
    bridge.tick(start + Duration::from_millis(50));

    let statuses = transport.payloads_on("home/door1/status");
    assert_eq!(statuses.len(), 2);
    assert!(statuses[1].contains("\"door\":\"open\""));
}

#[test]
fn constant_reading_heartbeats_at_interval() {
    let transport = ScriptedTransport::default();
    let (mut bridge, _lock_pin, _reed_pin) = build_bridge(transport.clone(), true);
    let start = Instant::now();

    let mut elapsed = Duration::ZERO;
    while elapsed <= Duration::from_millis(10_000) {
        bridge.tick(start + elapsed);
        elapsed += Duration::from_millis(50);
    }

    // startup publish plus heartbeats at ~5s and ~10s
    assert_eq!(transport.payloads_on("home/door1/status").len(), 3);
}

#[test]
fn link_drop_blocks_until_reconnect_then_announces() {
    let transport = ScriptedTransport::default();
    let (mut bridge, _lock_pin, _reed_pin) = build_bridge(transport.clone(), true);
    let start = Instant::now();

    bridge.tick(start);
    transport.drop_link();
    transport.state.borrow_mut().connect_failures = 2;
    bridge.tick(start + Duration::from_millis(100));

    assert!(transport.state.borrow().connected);
    let events = transport.payloads_on("home/door1/event");
    assert_eq!(events.len(), 2);
    assert!(events[1].contains("\"event\":\"device_online\""));
}
