//! Descriptor and Basic Information handlers
//!
//! Both report static identity values and never touch device state.

use smartlamp_shared::codec::TlvWriter;
use smartlamp_shared::identity;

use crate::command::{CommandResult, Response};

pub fn handle_descriptor() -> CommandResult {
    let mut writer = TlvWriter::new();
    writer
        .put_uint8(0, identity::ROOT_ENDPOINT)
        .put_uint16(1, identity::DEVICE_TYPE)
        .put_byte_array(2, &identity::SERVER_CLUSTER_LIST);
    CommandResult::Completed(Response::Tlv(writer.take()))
}

pub fn handle_basic_info() -> CommandResult {
    let mut writer = TlvWriter::new();
    writer
        .put_uint8(0, identity::ROOT_ENDPOINT)
        .put_uint16(1, identity::VENDOR_ID)
        .put_uint16(2, identity::PRODUCT_ID)
        .put_uint8(3, identity::SOFTWARE_VERSION_MAJOR);
    CommandResult::Completed(Response::Tlv(writer.take()))
}
