//! Delayed-off countdown task

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::device::Device;

/// Wait for `deadline`, then switch the lamp off unless cancelled first
pub(super) async fn run(device: Device, deadline: Instant, token: CancellationToken) {
    tokio::select! {
        _ = token.cancelled() => {
            debug!("[TIMER] Delayed-off cancelled");
            return;
        }
        _ = sleep_until(deadline) => {}
    }

    let fired = device
        .update(|state, actuator| {
            // A replacement may have been armed while we waited for the lock
            if token.is_cancelled() {
                return false;
            }
            actuator.set_brightness(0);
            state.turn_off();
            state.delayed_off.cancel_pending();
            true
        })
        .await;

    if fired {
        info!("[TIMER] Delayed-off expired, lamp off");
    } else {
        debug!("[TIMER] Delayed-off cancelled");
    }
}
