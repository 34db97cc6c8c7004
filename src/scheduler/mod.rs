//! Timed Task Scheduler
//!
//! Spawns the lamp's background behaviours on the tokio runtime: a single
//! cancellable delayed-off countdown and any number of identify blink
//! sequences.

mod delayed_off;
mod identify;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::device::Device;

/// Errors raised when a background task cannot be started
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("No tokio runtime available to spawn on")]
    NoRuntime,
}

/// Starts and tracks timed tasks against a shared device
#[derive(Clone)]
pub struct TimerScheduler {
    device: Device,
}

impl TimerScheduler {
    pub fn new(device: Device) -> Self {
        Self { device }
    }

    /// Arm the delayed-off countdown, replacing any outstanding one
    ///
    /// Zero clears the countdown without starting a new one.
    pub async fn schedule_delayed_off(&self, seconds: u16) -> Result<(), SchedulerError> {
        let runtime = if seconds == 0 {
            None
        } else {
            Handle::try_current().ok()
        };

        let device = self.device.clone();
        self.device
            .update(|state, _| -> Result<(), SchedulerError> {
                state.delayed_off.cancel_pending();
                if seconds == 0 {
                    debug!("[TIMER] Delayed-off cleared");
                    return Ok(());
                }
                let runtime = runtime.ok_or(SchedulerError::NoRuntime)?;

                let token = CancellationToken::new();
                let deadline = Instant::now() + Duration::from_secs(u64::from(seconds));
                state.delayed_off.arm(deadline, token.clone());
                runtime.spawn(delayed_off::run(device, deadline, token));

                info!("[TIMER] Delayed-off armed for {} s", seconds);
                Ok(())
            })
            .await
    }

    /// Whole seconds left on the delayed-off countdown
    pub async fn remaining_delayed_off(&self) -> u16 {
        self.device
            .update(|state, _| state.delayed_off.remaining_secs(Instant::now()))
            .await
    }

    /// Blink the lamp for `seconds`; zero only re-asserts the current output
    ///
    /// Sequences started while others are running blink alongside them.
    pub async fn start_identify(&self, seconds: u16) -> Result<(), SchedulerError> {
        if seconds == 0 {
            self.device
                .update(|state, actuator| actuator.set_brightness(state.output_level()))
                .await;
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?;
        runtime.spawn(identify::run(self.device.clone(), seconds));
        info!("[IDENTIFY] Blinking for {} s", seconds);
        Ok(())
    }
}
