//! Device state record

use smartlamp_shared::state_machine::PairingStateMachine;
use smartlamp_shared::timing::DEFAULT_ON_LEVEL;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// The delayed-off countdown; at most one is outstanding
#[derive(Debug, Default)]
pub struct DelayedOff {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl DelayedOff {
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Record a new countdown, cancelling any previous one
    pub fn arm(&mut self, deadline: Instant, cancel: CancellationToken) {
        self.cancel_pending();
        self.deadline = Some(deadline);
        self.cancel = Some(cancel);
    }

    /// Cancel the outstanding countdown, if any, and clear the deadline
    pub fn cancel_pending(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
        self.deadline = None;
    }

    /// Whole seconds left before `now`, zero when unset or already passed
    pub fn remaining_secs(&self, now: Instant) -> u16 {
        match self.deadline {
            Some(deadline) if deadline > now => {
                let secs = deadline.duration_since(now).as_secs();
                u16::try_from(secs).unwrap_or(u16::MAX)
            }
            _ => 0,
        }
    }
}

/// The single shared device record
#[derive(Debug, Default)]
pub struct DeviceState {
    pub power: bool,
    pub level: u8,
    pub delayed_off: DelayedOff,
    pub pairing: PairingStateMachine,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Brightness the actuator should show for the current on/off and level
    pub fn output_level(&self) -> u8 {
        if self.power {
            self.level
        } else {
            0
        }
    }

    /// Brightness used by the identify blink
    pub fn blink_level(&self) -> u8 {
        if self.level != 0 {
            self.level
        } else {
            DEFAULT_ON_LEVEL
        }
    }

    /// Switch on, restoring the default level if none is stored
    ///
    /// Returns the level to drive.
    pub fn turn_on(&mut self) -> u8 {
        if self.level == 0 {
            self.level = DEFAULT_ON_LEVEL;
        }
        self.power = true;
        self.level
    }

    pub fn turn_off(&mut self) {
        self.level = 0;
        self.power = false;
    }

    /// Flip power; returns the level to drive
    pub fn toggle(&mut self) -> u8 {
        if self.power {
            self.turn_off();
            0
        } else {
            self.turn_on()
        }
    }

    /// Move to an explicit level; zero switches off
    pub fn set_level(&mut self, level: u8) {
        self.level = level;
        self.power = level > 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_turn_on_restores_default_level() {
        let mut state = DeviceState::new();
        assert_eq!(state.output_level(), 0);

        assert_eq!(state.turn_on(), 127);
        assert!(state.power);
        assert_eq!(state.output_level(), 127);
    }

    #[test]
    fn test_turn_on_keeps_existing_level() {
        let mut state = DeviceState::new();
        state.set_level(200);
        assert_eq!(state.turn_on(), 200);
        assert_eq!(state.turn_on(), 200);
        assert_eq!(state.level, 200);
    }

    #[test]
    fn test_toggle() {
        let mut state = DeviceState::new();
        assert_eq!(state.toggle(), 127);
        assert!(state.power);
        assert_eq!(state.toggle(), 0);
        assert!(!state.power);
        assert_eq!(state.level, 0);
    }

    #[test]
    fn test_set_level_zero_switches_off() {
        let mut state = DeviceState::new();
        state.set_level(50);
        assert!(state.power);
        state.set_level(0);
        assert!(!state.power);
        assert_eq!(state.output_level(), 0);
    }

    #[test]
    fn test_output_is_dark_when_off_with_stored_level() {
        let mut state = DeviceState::new();
        state.level = 90;
        state.power = false;
        assert_eq!(state.output_level(), 0);
        assert_eq!(state.blink_level(), 90);
    }

    #[test]
    fn test_blink_level_defaults() {
        let state = DeviceState::new();
        assert_eq!(state.blink_level(), 127);
    }

    #[tokio::test]
    async fn test_delayed_off_arm_replaces_previous() {
        let mut delayed_off = DelayedOff::default();
        let now = Instant::now();

        let first = CancellationToken::new();
        delayed_off.arm(now + Duration::from_secs(10), first.clone());
        let second = CancellationToken::new();
        delayed_off.arm(now + Duration::from_secs(4), second.clone());

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(delayed_off.remaining_secs(now), 4);
    }

    #[tokio::test]
    async fn test_delayed_off_remaining() {
        let mut delayed_off = DelayedOff::default();
        let now = Instant::now();
        assert_eq!(delayed_off.remaining_secs(now), 0);

        delayed_off.arm(now + Duration::from_millis(7900), CancellationToken::new());
        assert_eq!(delayed_off.remaining_secs(now), 7);
        assert_eq!(delayed_off.remaining_secs(now + Duration::from_secs(8)), 0);

        delayed_off.cancel_pending();
        assert!(!delayed_off.is_armed());
        assert_eq!(delayed_off.remaining_secs(now), 0);
    }
}
