//! Command handlers, one module per cluster

mod identify;
mod info;
mod level;
mod on_off;
mod pairing;

pub use identify::handle_identify;
pub use info::{handle_basic_info, handle_descriptor};
pub use level::{handle_level_read, handle_move_to_level};
pub use on_off::{handle_off, handle_on, handle_on_off_read, handle_on_off_write};
pub use pairing::{handle_pake1, handle_pake3, handle_param_request};

use std::net::SocketAddr;

use crate::device::Device;
use crate::scheduler::TimerScheduler;

/// Context passed to command handlers
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub device: &'a Device,
    pub scheduler: &'a TimerScheduler,
    pub sender: SocketAddr,
}
