//! Device Module
//!
//! Owns the single shared device record and the actuator it drives.
//! Every read or write of the record goes through one mutex, and actuator
//! writes happen while that mutex is held so the output always matches the
//! state that produced it.

mod actuator;
mod state;

pub use actuator::{Actuator, PwmActuator};
#[cfg(test)]
pub use actuator::RecordingActuator;
pub use state::DeviceState;

use std::sync::Arc;
use tokio::sync::Mutex;

/// Cloneable handle to the shared device state and actuator
#[derive(Clone)]
pub struct Device {
    state: Arc<Mutex<DeviceState>>,
    actuator: Arc<dyn Actuator>,
}

impl Device {
    /// Create a device in its power-on state (off, level 0, no timers, not pairing)
    pub fn new(actuator: Arc<dyn Actuator>) -> Self {
        Self {
            state: Arc::new(Mutex::new(DeviceState::new())),
            actuator,
        }
    }

    /// Run `f` with exclusive access to the state and the actuator
    pub async fn update<R>(&self, f: impl FnOnce(&mut DeviceState, &dyn Actuator) -> R) -> R {
        let mut state = self.state.lock().await;
        f(&mut *state, self.actuator.as_ref())
    }

    /// Copy of the on/off and level fields
    pub async fn snapshot(&self) -> (bool, u8) {
        let state = self.state.lock().await;
        (state.power, state.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initial_state() {
        let actuator = Arc::new(RecordingActuator::new());
        let device = Device::new(actuator.clone());

        assert_eq!(device.snapshot().await, (false, 0));
        let pairing_active = device.update(|state, _| state.pairing.is_active()).await;
        assert!(!pairing_active);
        assert!(actuator.writes().is_empty());
    }

    #[tokio::test]
    async fn test_update_drives_actuator_under_lock() {
        let actuator = Arc::new(RecordingActuator::new());
        let device = Device::new(actuator.clone());

        device
            .update(|state, actuator| {
                let level = state.turn_on();
                actuator.set_brightness(level);
            })
            .await;

        assert_eq!(device.snapshot().await, (true, 127));
        assert_eq!(actuator.writes(), vec![127]);
    }
}
