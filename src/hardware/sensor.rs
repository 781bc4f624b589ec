//! Door position sensor.

use super::SensorPin;

/// Door position as sampled from the reed switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Open,
    Closed,
}

impl DoorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DoorState::Open => "open",
            DoorState::Closed => "closed",
        }
    }
}

/// Reads the reed switch. Logic high means the switch is pulled to the
/// closed position. No debouncing happens here; the control loop samples
/// at its own cadence and takes the raw value.
pub struct DoorSensor<P: SensorPin> {
    pin: P,
}

impl<P: SensorPin> DoorSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    pub fn read(&mut self) -> DoorState {
        if self.pin.is_high() {
            DoorState::Closed
        } else {
            DoorState::Open
        }
    }
}
