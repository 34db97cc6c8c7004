//! Host-side helpers
//!
//! Request builders for every command the lamp understands, plus a lenient
//! reader for its responses. Unlike the device decoder, the reader also walks
//! byte-string records so descriptor and pairing responses can be inspected.

use bytes::Bytes;

use crate::codec::{CodecError, TlvWriter};
use crate::{attribute, cluster, command, pase, tag, PaseOpcode, ACK};

fn request(cluster_id: u16, command_id: u8) -> TlvWriter {
    let mut writer = TlvWriter::new();
    writer
        .put_uint8(tag::ENDPOINT, 0)
        .put_uint16(tag::CLUSTER, cluster_id)
        .put_uint8(tag::COMMAND, command_id);
    writer
}

/// On/Off cluster command (Off, On or Toggle)
pub fn on_off(command_id: u8) -> Bytes {
    request(cluster::ON_OFF, command_id).take()
}

/// Arm the delayed-off countdown; zero cancels it
pub fn delayed_off_write(seconds: u16) -> Bytes {
    let mut writer = request(cluster::ON_OFF, command::on_off::WRITE_ATTRIBUTE);
    writer
        .put_uint16(tag::ATTRIBUTE_ID, attribute::DELAYED_OFF)
        .put_uint16(tag::VALUE, seconds);
    writer.take()
}

pub fn delayed_off_read() -> Bytes {
    let mut writer = request(cluster::ON_OFF, command::on_off::READ_ATTRIBUTE);
    writer.put_uint16(tag::ATTRIBUTE_ID, attribute::DELAYED_OFF);
    writer.take()
}

pub fn move_to_level(level: u8) -> Bytes {
    let mut writer = request(cluster::LEVEL_CONTROL, command::level::MOVE_TO_LEVEL);
    writer.put_uint8(tag::LEVEL, level);
    writer.take()
}

/// Convert a 0-100 percentage into the 0-254 level range used by controllers
pub fn percent_to_level(percent: u8) -> u8 {
    (u16::from(percent.min(100)) * 254 / 100) as u8
}

pub fn level_read() -> Bytes {
    let mut writer = request(cluster::LEVEL_CONTROL, command::level::READ_ATTRIBUTE);
    writer.put_uint16(tag::ATTRIBUTE_ID, attribute::CURRENT_LEVEL);
    writer.take()
}

pub fn identify(seconds: u16) -> Bytes {
    let mut writer = request(cluster::IDENTIFY, command::identify::IDENTIFY);
    writer.put_uint16(tag::IDENTIFY_TIME, seconds);
    writer.take()
}

pub fn descriptor_request() -> Bytes {
    request(cluster::DESCRIPTOR, command::READ_INFO).take()
}

pub fn basic_info_request() -> Bytes {
    request(cluster::BASIC_INFORMATION, command::READ_INFO).take()
}

/// PBKDFParamRequest with the placeholder random and iteration fields
pub fn pbkdf_param_request() -> Result<Bytes, CodecError> {
    let mut writer = request(cluster::PAIRING, PaseOpcode::PbkdfParamRequest as u8);
    writer.put_uint16(3, pase::SESSION_ID);
    writer.put_bytes(4, &[0u8; 16])?;
    writer.put_uint16(5, 8000);
    writer.put_bytes(6, &[0u8; 40])?;
    Ok(writer.take())
}

pub fn pake1() -> Result<Bytes, CodecError> {
    let mut writer = request(cluster::PAIRING, PaseOpcode::Pake1 as u8);
    writer.put_bytes(4, &[0u8; 65])?;
    Ok(writer.take())
}

pub fn pake3() -> Bytes {
    request(cluster::PAIRING, PaseOpcode::Pake3 as u8).take()
}

pub fn is_ack(data: &[u8]) -> bool {
    data == ACK
}

/// Value of a record read by [`read_records`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    UInt(u16),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub tag: u8,
    pub value: RecordValue,
}

/// Walk all records of a response, stopping at the first truncated one
pub fn read_records(data: &[u8]) -> Vec<Record> {
    let mut records = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let ctl = data[i];
        let tag = (ctl >> 5) & 0x07;
        i += 1;

        let value = if ctl & 0x1C == 0x04 {
            if ctl & 0x01 == 0 {
                let Some(&len) = data.get(i) else { break };
                let Some(&value) = data.get(i + 1) else { break };
                i += 1 + usize::from(len);
                RecordValue::UInt(u16::from(value))
            } else {
                let Some(bytes) = data.get(i..i + 2) else { break };
                i += 2;
                RecordValue::UInt(u16::from_le_bytes([bytes[0], bytes[1]]))
            }
        } else {
            let Some(&len) = data.get(i) else { break };
            let start = i + 1;
            let Some(bytes) = data.get(start..start + usize::from(len)) else { break };
            i = start + usize::from(len);
            RecordValue::Bytes(bytes.to_vec())
        };

        records.push(Record { tag, value });
    }

    records
}

fn uint(records: &[Record], tag: u8) -> Option<u16> {
    records.iter().rev().find_map(|r| match r.value {
        RecordValue::UInt(v) if r.tag == tag => Some(v),
        _ => None,
    })
}

fn byte_string(records: &[Record], tag: u8) -> Option<&[u8]> {
    records.iter().rev().find_map(|r| match &r.value {
        RecordValue::Bytes(v) if r.tag == tag => Some(v.as_slice()),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicInfo {
    pub endpoint: u16,
    pub vendor_id: u16,
    pub product_id: u16,
    pub sw_major: u16,
}

pub fn decode_basic_info(data: &[u8]) -> Option<BasicInfo> {
    let records = read_records(data);
    Some(BasicInfo {
        endpoint: uint(&records, 0)?,
        vendor_id: uint(&records, 1)?,
        product_id: uint(&records, 2)?,
        sw_major: uint(&records, 3)?,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub endpoint: u16,
    pub device_type: u16,
    pub server_clusters: Vec<u16>,
}

pub fn decode_descriptor(data: &[u8]) -> Option<Descriptor> {
    let records = read_records(data);
    let server_clusters = byte_string(&records, 2)?
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Some(Descriptor {
        endpoint: uint(&records, 0)?,
        device_type: uint(&records, 1)?,
        server_clusters,
    })
}

/// Decode an attribute read response into `(attribute id, value)`
pub fn decode_attribute(data: &[u8]) -> Option<(u16, u16)> {
    let records = read_records(data);
    Some((uint(&records, tag::ATTRIBUTE_ID)?, uint(&records, tag::VALUE)?))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbkdfParamResponse {
    pub session_id: u16,
    pub iterations_field: u16,
    pub params_field: u16,
    pub salt: Vec<u8>,
}

pub fn decode_pbkdf_param_response(data: &[u8]) -> Option<PbkdfParamResponse> {
    let records = read_records(data);
    Some(PbkdfParamResponse {
        session_id: uint(&records, 0)?,
        iterations_field: uint(&records, 1)?,
        params_field: uint(&records, 2)?,
        salt: byte_string(&records, 3)?.to_vec(),
    })
}

/// Check that a response is a Pake2 placeholder
pub fn is_pake2(data: &[u8]) -> bool {
    data.len() == 1 + pase::PAKE2_PAYLOAD_LEN && data[0] == PaseOpcode::Pake2 as u8
}
