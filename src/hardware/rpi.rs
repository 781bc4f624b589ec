//! Raspberry Pi GPIO adapters for the pin traits.
//!
//! Pin acquisition can fail (missing gpiochip, pin already exported); after
//! that, level reads and writes are infallible in rppal.

use rppal::gpio::{Gpio, InputPin, OutputPin};
use tracing::info;

use super::{ActuatorPin, SensorPin};

#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    #[error("Failed to access GPIO: {0}")]
    Gpio(#[from] rppal::gpio::Error),
}

/// Claim the lock output pin, driven low (locked) from the start.
pub fn lock_pin(gpio: &Gpio, pin: u8) -> Result<OutputPin, HardwareError> {
    let pin = gpio.get(pin)?.into_output_low();
    info!("Claimed lock actuator on GPIO {}", pin.pin());
    Ok(pin)
}

/// Claim the reed switch input pin with the internal pull-up enabled.
/// High level maps to a closed door.
pub fn sensor_pin(gpio: &Gpio, pin: u8) -> Result<InputPin, HardwareError> {
    let pin = gpio.get(pin)?.into_input_pullup();
    info!("Claimed door sensor on GPIO {}", pin.pin());
    Ok(pin)
}

impl ActuatorPin for OutputPin {
    fn set_high(&mut self) {
        OutputPin::set_high(self);
    }

    fn set_low(&mut self) {
        OutputPin::set_low(self);
    }
}

impl SensorPin for InputPin {
    fn is_high(&mut self) -> bool {
        InputPin::is_high(self)
    }
}
