//! Lock actuator driver.
//!
//! Pin high energizes the release coil (unlocked), pin low holds the bolt
//! (locked). The driver always starts locked, matching the power-on state
//! the rest of the system assumes.

use std::thread;
use std::time::Duration;

use tracing::debug;

use super::ActuatorPin;

pub struct LockDriver<P: ActuatorPin> {
    pin: P,
    locked: bool,
}

impl<P: ActuatorPin> LockDriver<P> {
    pub fn new(pin: P) -> Self {
        let mut driver = Self { pin, locked: false };
        driver.set_locked(true);
        driver
    }

    /// Drive the pin to the level encoding `locked`. Idempotent; calling
    /// with the current state rewrites the same level and nothing else.
    pub fn set_locked(&mut self, locked: bool) {
        if locked {
            self.pin.set_low();
        } else {
            self.pin.set_high();
        }
        self.locked = locked;
        debug!("Lock actuator set to {}", if locked { "locked" } else { "unlocked" });
    }

    /// Momentary release: unlock, hold for `duration`, relock.
    ///
    /// Blocks the calling thread for the full pulse, so no other actuator
    /// command can interleave with it; a second unlock request is simply
    /// handled after this one completes and starts its own pulse.
    pub fn pulse_unlock(&mut self, duration: Duration) {
        self.set_locked(false);
        thread::sleep(duration);
        self.set_locked(true);
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every level written to the pin.
    struct RecordingPin {
        writes: Vec<bool>,
    }

    impl RecordingPin {
        fn new() -> Self {
            Self { writes: Vec::new() }
        }
    }

    impl ActuatorPin for RecordingPin {
        fn set_high(&mut self) {
            self.writes.push(true);
        }

        fn set_low(&mut self) {
            self.writes.push(false);
        }
    }

    #[test]
    fn driver_initializes_locked() {
        let driver = LockDriver::new(RecordingPin::new());
        assert!(driver.is_locked());
        assert_eq!(driver.pin.writes, vec![false]);
    }

    #[test]
    fn set_locked_is_idempotent() {
        let mut driver = LockDriver::new(RecordingPin::new());
        driver.set_locked(true);
        driver.set_locked(true);
        assert!(driver.is_locked());
        // every write is the locked level, never a release pulse
        assert!(driver.pin.writes.iter().all(|level| !level));
    }

    #[test]
    fn pulse_unlock_raises_then_restores() {
        let mut driver = LockDriver::new(RecordingPin::new());
        driver.pulse_unlock(Duration::from_millis(5));
        assert!(driver.is_locked());
        assert_eq!(driver.pin.writes, vec![false, true, false]);
    }

    #[test]
    fn pulse_relocks_even_from_unlocked_state() {
        let mut driver = LockDriver::new(RecordingPin::new());
        driver.set_locked(false);
        driver.pulse_unlock(Duration::from_millis(5));
        assert!(driver.is_locked());
    }
}
