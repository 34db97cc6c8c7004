//! On/Off cluster handlers

use bytes::Bytes;
use smartlamp_shared::codec::TlvWriter;
use smartlamp_shared::{attribute, tag};
use tracing::info;

use super::HandlerContext;
use crate::command::{CommandResult, Response};

/// Switch on; a zero level is restored to the default brightness
pub async fn handle_on(ctx: &HandlerContext<'_>) -> CommandResult {
    let level = ctx
        .device
        .update(|state, actuator| {
            let level = state.turn_on();
            actuator.set_brightness(level);
            level
        })
        .await;

    info!("[ONOFF] Lamp on (level={})", level);
    CommandResult::Completed(Response::Ack)
}

pub async fn handle_off(ctx: &HandlerContext<'_>) -> CommandResult {
    ctx.device
        .update(|state, actuator| {
            state.turn_off();
            actuator.set_brightness(0);
        })
        .await;

    info!("[ONOFF] Lamp off");
    CommandResult::Completed(Response::Ack)
}

/// Write the delayed-off attribute, or toggle when any other attribute is named
pub async fn handle_on_off_write(
    ctx: &HandlerContext<'_>,
    attribute_id: u16,
    value: u16,
) -> CommandResult {
    if attribute_id == attribute::DELAYED_OFF {
        return match ctx.scheduler.schedule_delayed_off(value).await {
            Ok(()) => CommandResult::Completed(Response::Ack),
            Err(e) => CommandResult::Failed {
                message: format!("Delayed-off not armed: {}", e),
            },
        };
    }

    let (power, level) = ctx
        .device
        .update(|state, actuator| {
            let level = state.toggle();
            actuator.set_brightness(level);
            (state.power, level)
        })
        .await;

    info!(
        "[ONOFF] Toggle -> {} (level={})",
        if power { "on" } else { "off" },
        level
    );
    CommandResult::Completed(Response::Ack)
}

/// Read the delayed-off countdown; other attributes are only acknowledged
pub async fn handle_on_off_read(ctx: &HandlerContext<'_>, attribute_id: u16) -> CommandResult {
    if attribute_id != attribute::DELAYED_OFF {
        return CommandResult::Completed(Response::Ack);
    }

    let remaining = ctx.scheduler.remaining_delayed_off().await;
    CommandResult::Completed(Response::Tlv(attribute_report(attribute_id, remaining)))
}

fn attribute_report(attribute_id: u16, value: u16) -> Bytes {
    let mut writer = TlvWriter::new();
    writer
        .put_uint16(tag::ATTRIBUTE_ID, attribute_id)
        .put_uint16(tag::VALUE, value);
    writer.take()
}
