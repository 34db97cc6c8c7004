//! Compact TLV codec
//!
//! Every record starts with a control octet:
//! ```text
//!   7   6   5   4   3   2   1   0
//! [ tag (0-7) ][ base type (4b) ][ L ]
//! ```
//!
//! Unsigned integers (base type `0x04`) are the only decodable records:
//! - `L = 0`: `[ ctl, 0x01, value ]`
//! - `L = 1`: `[ ctl, lo, hi ]` (little-endian)
//!
//! Byte strings (`0x10`) are produced for descriptor and pairing responses
//! but never accepted inbound.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Base type marker for unsigned integers
pub const TYPE_UINT: u8 = 0x04;

/// Base type marker for byte strings (encoder only)
pub const TYPE_BYTES: u8 = 0x10;

const TYPE_MASK: u8 = 0x1E;
const LEN_2_BYTES: u8 = 0x01;
const TAG_SHIFT: u8 = 5;
const TAG_MASK: u8 = 0x07;

/// Every decodable record is exactly three bytes long
pub const RECORD_LEN: usize = 3;

/// Largest payload a byte string can carry behind its 1-byte length
pub const MAX_BYTES_LEN: usize = u8::MAX as usize;

/// Errors that can occur during encoding/decoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Not enough data: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Unsupported TLV base type: {0:#04x}")]
    UnsupportedType(u8),

    #[error("Invalid length byte for 1-byte value: {0}")]
    InvalidLength(u8),

    #[error("Byte string too long: {0} bytes (max: {MAX_BYTES_LEN})")]
    PayloadTooLong(usize),
}

/// An unsigned integer value of width 1 or 2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    UInt8(u8),
    UInt16(u16),
}

/// A single decoded TLV record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub tag: u8,
    pub value: Value,
}

fn control(tag: u8, base_type: u8) -> u8 {
    debug_assert!(tag <= TAG_MASK, "TLV tag {tag} does not fit in 3 bits");
    base_type | ((tag & TAG_MASK) << TAG_SHIFT)
}

/// Decode one record starting at `offset`
///
/// Returns the element and the number of bytes consumed.
pub fn decode_next(buf: &[u8], offset: usize) -> Result<(Element, usize), CodecError> {
    let rest = buf.get(offset..).unwrap_or_default();
    if rest.len() < 2 {
        return Err(CodecError::Truncated {
            needed: 2,
            available: rest.len(),
        });
    }

    let ctl = rest[0];
    let tag = (ctl >> TAG_SHIFT) & TAG_MASK;

    let base_type = ctl & TYPE_MASK;
    if base_type != TYPE_UINT {
        return Err(CodecError::UnsupportedType(base_type));
    }

    if rest.len() < RECORD_LEN {
        return Err(CodecError::Truncated {
            needed: RECORD_LEN,
            available: rest.len(),
        });
    }

    let value = if ctl & LEN_2_BYTES == 0 {
        if rest[1] != 1 {
            return Err(CodecError::InvalidLength(rest[1]));
        }
        Value::UInt8(rest[2])
    } else {
        Value::UInt16(u16::from_le_bytes([rest[1], rest[2]]))
    };

    Ok((Element { tag, value }, RECORD_LEN))
}

/// Encode a 1-byte unsigned integer record
pub fn encode_uint8(tag: u8, value: u8) -> Bytes {
    let mut writer = TlvWriter::new();
    writer.put_uint8(tag, value);
    writer.take()
}

/// Encode a 2-byte unsigned integer record
pub fn encode_uint16(tag: u8, value: u16) -> Bytes {
    let mut writer = TlvWriter::new();
    writer.put_uint16(tag, value);
    writer.take()
}

/// Encode a byte string record
pub fn encode_bytes(tag: u8, data: &[u8]) -> Result<Bytes, CodecError> {
    let mut writer = TlvWriter::new();
    writer.put_bytes(tag, data)?;
    Ok(writer.take())
}

/// Builder for multi-record payloads
#[derive(Debug, Default)]
pub struct TlvWriter {
    buffer: BytesMut,
}

impl TlvWriter {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(64),
        }
    }

    pub fn put_uint8(&mut self, tag: u8, value: u8) -> &mut Self {
        self.buffer.put_u8(control(tag, TYPE_UINT));
        self.buffer.put_u8(1);
        self.buffer.put_u8(value);
        self
    }

    pub fn put_uint16(&mut self, tag: u8, value: u16) -> &mut Self {
        self.buffer.put_u8(control(tag, TYPE_UINT) | LEN_2_BYTES);
        self.buffer.put_u16_le(value);
        self
    }

    pub fn put_bytes(&mut self, tag: u8, data: &[u8]) -> Result<&mut Self, CodecError> {
        let len = u8::try_from(data.len()).map_err(|_| CodecError::PayloadTooLong(data.len()))?;
        self.put_byte_string(tag, len, data);
        Ok(self)
    }

    /// Byte string whose size is checked at compile time
    pub fn put_byte_array<const N: usize>(&mut self, tag: u8, data: &[u8; N]) -> &mut Self {
        const { assert!(N <= MAX_BYTES_LEN, "byte string too long for a 1-byte length") };
        self.put_byte_string(tag, N as u8, data);
        self
    }

    fn put_byte_string(&mut self, tag: u8, len: u8, data: &[u8]) {
        self.buffer.reserve(2 + data.len());
        self.buffer.put_u8(control(tag, TYPE_BYTES));
        self.buffer.put_u8(len);
        self.buffer.put_slice(data);
    }

    /// Take the encoded bytes, leaving an empty buffer
    pub fn take(&mut self) -> Bytes {
        self.buffer.split().freeze()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// A datagram decoded greedily into its leading run of valid records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedMessage {
    elements: Vec<Element>,
    consumed: usize,
}

impl DecodedMessage {
    /// Decode until the input is exhausted or a record cannot be decoded
    pub fn decode(buf: &[u8]) -> Self {
        let mut elements = Vec::new();
        let mut offset = 0;

        while offset < buf.len() {
            match decode_next(buf, offset) {
                Ok((element, used)) => {
                    elements.push(element);
                    offset += used;
                }
                Err(_) => break,
            }
        }

        Self {
            elements,
            consumed: offset,
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Bytes covered by the decoded records
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Last 1-byte value recorded under `tag`
    pub fn uint8(&self, tag: u8) -> Option<u8> {
        self.elements.iter().rev().find_map(|e| match e.value {
            Value::UInt8(v) if e.tag == tag => Some(v),
            _ => None,
        })
    }

    /// Last 2-byte value recorded under `tag`
    pub fn uint16(&self, tag: u8) -> Option<u16> {
        self.elements.iter().rev().find_map(|e| match e.value {
            Value::UInt16(v) if e.tag == tag => Some(v),
            _ => None,
        })
    }
}
