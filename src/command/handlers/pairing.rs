//! Stubbed PASE exchange handlers
//!
//! The responses are fixed placeholders; nothing here is cryptographic.

use bytes::{BufMut, Bytes, BytesMut};
use smartlamp_shared::codec::TlvWriter;
use smartlamp_shared::pase;
use smartlamp_shared::state_machine::{PairingEvent, TransitionResult};
use smartlamp_shared::PaseOpcode;
use tracing::info;

use super::HandlerContext;
use crate::command::{CommandResult, Response};

/// Start (or restart) an exchange with the sender
///
/// A parameter request is accepted in every pairing state.
pub async fn handle_param_request(ctx: &HandlerContext<'_>) -> CommandResult {
    let event = PairingEvent::ParamRequest { peer: ctx.sender };
    ctx.device
        .update(|state, _| state.pairing.process_event(event))
        .await;

    info!("[PASE] PBKDFParamRequest from {}", ctx.sender);
    CommandResult::Completed(Response::Tlv(pbkdf_param_response()))
}

pub async fn handle_pake1(ctx: &HandlerContext<'_>) -> CommandResult {
    let result = ctx
        .device
        .update(|state, _| state.pairing.process_event(PairingEvent::Pake1))
        .await;

    match result {
        TransitionResult::Success(_) => {
            info!("[PASE] Pake1 received, sending Pake2");
            CommandResult::Completed(Response::Raw(pake2()))
        }
        TransitionResult::Invalid { from, .. } => rejected("Pake1", from),
    }
}

pub async fn handle_pake3(ctx: &HandlerContext<'_>) -> CommandResult {
    let result = ctx
        .device
        .update(|state, _| state.pairing.process_event(PairingEvent::Pake3))
        .await;

    match result {
        TransitionResult::Success(_) => {
            info!("[PASE] Pairing complete");
            CommandResult::Completed(Response::Ack)
        }
        TransitionResult::Invalid { from, .. } => rejected("Pake3", from),
    }
}

fn rejected(message: &str, from: impl std::fmt::Debug) -> CommandResult {
    CommandResult::Rejected {
        message: format!("{} out of order in state {:?}", message, from),
    }
}

fn pbkdf_param_response() -> Bytes {
    let mut writer = TlvWriter::new();
    writer
        .put_uint16(0, pase::SESSION_ID)
        .put_uint8(1, pase::PBKDF_ITERATIONS_FIELD)
        .put_uint8(2, pase::PBKDF_PARAMS_FIELD)
        .put_byte_array(3, &[0u8; pase::SALT_LEN]);
    writer.take()
}

/// Opcode byte followed by an all-zero body
fn pake2() -> Bytes {
    let mut buf = BytesMut::with_capacity(1 + pase::PAKE2_PAYLOAD_LEN);
    buf.put_u8(PaseOpcode::Pake2 as u8);
    buf.put_bytes(0, pase::PAKE2_PAYLOAD_LEN);
    buf.freeze()
}
