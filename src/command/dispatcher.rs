//! Command dispatcher - decodes, routes and executes inbound datagrams

use std::net::SocketAddr;

use bytes::Bytes;
use smartlamp_shared::codec::DecodedMessage;
use smartlamp_shared::ACK;
use tracing::{debug, warn};

use super::handlers::{self, HandlerContext};
use super::router::{route, Action};
use crate::device::Device;
use crate::scheduler::TimerScheduler;

/// Reply sent back to the datagram's sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The literal `ACK`
    Ack,
    /// TLV-encoded records
    Tlv(Bytes),
    /// Raw bytes outside the TLV format (Pake2)
    Raw(Bytes),
}

impl Response {
    pub fn into_bytes(self) -> Bytes {
        match self {
            Response::Ack => Bytes::from_static(ACK),
            Response::Tlv(payload) | Response::Raw(payload) => payload,
        }
    }
}

/// Result of command execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Command executed; send the response
    Completed(Response),
    /// Command accepted but a side effect could not be started; still acknowledged
    Failed { message: String },
    /// Command not valid in the current state; no response
    Rejected { message: String },
}

/// Executes datagrams against the shared device
#[derive(Clone)]
pub struct CommandDispatcher {
    device: Device,
    scheduler: TimerScheduler,
}

impl CommandDispatcher {
    pub fn new(device: Device, scheduler: TimerScheduler) -> Self {
        Self { device, scheduler }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Handle one datagram, returning the reply to send, if any
    pub async fn dispatch(&self, datagram: &[u8], sender: SocketAddr) -> Option<Response> {
        let message = DecodedMessage::decode(datagram);
        if message.consumed() < datagram.len() {
            debug!(
                "[TLV] Decoded {} of {} bytes ({} records)",
                message.consumed(),
                datagram.len(),
                message.elements().len()
            );
        }

        let Some(action) = route(&message) else {
            debug!("[TLV] No handler for datagram from {}", sender);
            return None;
        };
        debug!("[TLV] {:?} from {}", action, sender);

        let ctx = HandlerContext {
            device: &self.device,
            scheduler: &self.scheduler,
            sender,
        };

        let result = match action {
            Action::On => handlers::handle_on(&ctx).await,
            Action::Off => handlers::handle_off(&ctx).await,
            Action::WriteOnOff { attribute, value } => {
                handlers::handle_on_off_write(&ctx, attribute, value).await
            }
            Action::ReadOnOff { attribute } => handlers::handle_on_off_read(&ctx, attribute).await,
            Action::Identify { seconds } => handlers::handle_identify(&ctx, seconds).await,
            Action::MoveToLevel { level } => handlers::handle_move_to_level(&ctx, level).await,
            Action::ReadLevel { attribute } => handlers::handle_level_read(&ctx, attribute).await,
            Action::ReadDescriptor => handlers::handle_descriptor(),
            Action::ReadBasicInfo => handlers::handle_basic_info(),
            Action::ParamRequest => handlers::handle_param_request(&ctx).await,
            Action::Pake1 => handlers::handle_pake1(&ctx).await,
            Action::Pake3 => handlers::handle_pake3(&ctx).await,
        };

        match result {
            CommandResult::Completed(response) => Some(response),
            CommandResult::Failed { message } => {
                warn!("[TLV] {:?}: {}", action, message);
                Some(Response::Ack)
            }
            CommandResult::Rejected { message } => {
                debug!("[PASE] Ignored: {}", message);
                None
            }
        }
    }
}
