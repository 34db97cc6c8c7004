//! Level Control cluster handlers

use smartlamp_shared::codec::TlvWriter;
use smartlamp_shared::{attribute, tag};
use tracing::info;

use super::HandlerContext;
use crate::command::{CommandResult, Response};

/// Move straight to `level`; zero also switches the lamp off
pub async fn handle_move_to_level(ctx: &HandlerContext<'_>, level: u8) -> CommandResult {
    ctx.device
        .update(|state, actuator| {
            state.set_level(level);
            actuator.set_brightness(level);
        })
        .await;

    info!("[LEVEL] Level set to {}", level);
    CommandResult::Completed(Response::Ack)
}

pub async fn handle_level_read(ctx: &HandlerContext<'_>, attribute_id: u16) -> CommandResult {
    if attribute_id != attribute::CURRENT_LEVEL {
        return CommandResult::Completed(Response::Ack);
    }

    let (_, level) = ctx.device.snapshot().await;
    let mut writer = TlvWriter::new();
    writer
        .put_uint16(tag::ATTRIBUTE_ID, attribute_id)
        .put_uint8(tag::VALUE, level);
    CommandResult::Completed(Response::Tlv(writer.take()))
}
