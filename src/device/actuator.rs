//! Hardware actuator abstraction

use std::sync::atomic::{AtomicU8, Ordering};
use tracing::trace;

/// Brightness output of the lamp
pub trait Actuator: Send + Sync {
    /// Drive the output to `level` (0 = dark, 255 = full duty)
    fn set_brightness(&self, level: u8);
}

/// 8-bit PWM channel driving the LED
///
/// Peripheral setup belongs to the board bring-up; this keeps the last duty
/// value written so it can be reported.
#[derive(Debug, Default)]
pub struct PwmActuator {
    channel: u8,
    duty: AtomicU8,
}

impl PwmActuator {
    pub fn new(channel: u8) -> Self {
        Self {
            channel,
            duty: AtomicU8::new(0),
        }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Last duty value written
    pub fn duty(&self) -> u8 {
        self.duty.load(Ordering::Relaxed)
    }
}

impl Actuator for PwmActuator {
    fn set_brightness(&self, level: u8) {
        self.duty.store(level, Ordering::Relaxed);
        trace!("[PWM] channel={} duty={}", self.channel, level);
    }
}

/// Test double recording every brightness write
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingActuator {
    writes: std::sync::Mutex<Vec<u8>>,
}

#[cfg(test)]
impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<u8> {
        self.writes.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<u8> {
        self.writes.lock().unwrap().last().copied()
    }
}

#[cfg(test)]
impl Actuator for RecordingActuator {
    fn set_brightness(&self, level: u8) {
        self.writes.lock().unwrap().push(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pwm_keeps_last_duty() {
        let pwm = PwmActuator::new(0);
        assert_eq!(pwm.duty(), 0);
        pwm.set_brightness(200);
        pwm.set_brightness(17);
        assert_eq!(pwm.duty(), 17);
        assert_eq!(pwm.channel(), 0);
    }

    #[test]
    fn test_recording_actuator() {
        let actuator = RecordingActuator::new();
        assert_eq!(actuator.last(), None);
        actuator.set_brightness(1);
        actuator.set_brightness(2);
        assert_eq!(actuator.writes(), vec![1, 2]);
        assert_eq!(actuator.last(), Some(2));
    }
}
