//! Identify blink task

use smartlamp_shared::timing::{BLINK_HALF_CYCLES_PER_SECOND, BLINK_HALF_PERIOD};
use tokio::time::sleep;
use tracing::debug;

use crate::device::Device;

/// Alternate dark and blink brightness, then restore the regular output
///
/// Only the actuator is written; power and level are read at every step.
pub(super) async fn run(device: Device, seconds: u16) {
    let half_cycles = u32::from(seconds) * BLINK_HALF_CYCLES_PER_SECOND;
    let mut lit = false;

    for _ in 0..half_cycles {
        lit = !lit;
        device
            .update(|state, actuator| {
                actuator.set_brightness(if lit { state.blink_level() } else { 0 });
            })
            .await;
        sleep(BLINK_HALF_PERIOD).await;
    }

    device
        .update(|state, actuator| actuator.set_brightness(state.output_level()))
        .await;
    debug!("[IDENTIFY] Finished after {} s", seconds);
}
