//! Identify cluster handler

use super::HandlerContext;
use crate::command::{CommandResult, Response};

pub async fn handle_identify(ctx: &HandlerContext<'_>, seconds: u16) -> CommandResult {
    match ctx.scheduler.start_identify(seconds).await {
        Ok(()) => CommandResult::Completed(Response::Ack),
        Err(e) => CommandResult::Failed {
            message: format!("Identify not started: {}", e),
        },
    }
}
