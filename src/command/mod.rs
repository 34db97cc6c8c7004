//! Command handling for the lamp
//!
//! This module handles:
//! - Decoding inbound datagrams into TLV records
//! - Routing endpoint/cluster/command triples to actions
//! - Executing actions against the shared device
//! - Building the reply (`ACK`, TLV records or raw bytes)

mod dispatcher;
pub mod handlers;
mod router;

pub use dispatcher::{CommandDispatcher, CommandResult, Response};
