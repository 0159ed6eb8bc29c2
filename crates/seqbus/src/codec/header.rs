// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed message-header layout.
//!
//! Every message on the bus starts with the same 18-byte header; the offsets
//! here are the single source of truth shared by the sequencer, publishers,
//! and generated codecs. The schema generator verifies at generation time
//! that the schema's `<header>` matches this layout.

use super::{CodecError, CodecResult};
use crate::core::buffer;

pub const APPLICATION_ID_OFFSET: usize = 0;
pub const APPLICATION_SEQUENCE_NUMBER_OFFSET: usize = 2;
pub const TIMESTAMP_OFFSET: usize = 6;
pub const OPTIONAL_FIELDS_INDEX_OFFSET: usize = 14;
pub const SCHEMA_VERSION_OFFSET: usize = 16;
pub const MESSAGE_TYPE_OFFSET: usize = 17;

/// Total fixed header size in bytes.
pub const HEADER_SIZE: usize = 18;

fn require_header(buffer: &[u8]) -> CodecResult<()> {
    if buffer.len() < HEADER_SIZE {
        return Err(CodecError::Malformed {
            offset: buffer.len(),
            reason: "buffer shorter than header",
        });
    }
    Ok(())
}

pub fn application_id(buffer: &[u8]) -> CodecResult<u16> {
    require_header(buffer)?;
    Ok(buffer::read_u16_at(buffer, APPLICATION_ID_OFFSET)?)
}

pub fn application_sequence_number(buffer: &[u8]) -> CodecResult<u32> {
    require_header(buffer)?;
    Ok(buffer::read_u32_at(
        buffer,
        APPLICATION_SEQUENCE_NUMBER_OFFSET,
    )?)
}

pub fn timestamp(buffer: &[u8]) -> CodecResult<u64> {
    require_header(buffer)?;
    Ok(buffer::read_u64_at(buffer, TIMESTAMP_OFFSET)?)
}

pub fn optional_fields_index(buffer: &[u8]) -> CodecResult<u16> {
    require_header(buffer)?;
    Ok(buffer::read_u16_at(buffer, OPTIONAL_FIELDS_INDEX_OFFSET)?)
}

pub fn schema_version(buffer: &[u8]) -> CodecResult<u8> {
    require_header(buffer)?;
    Ok(buffer::read_u8_at(buffer, SCHEMA_VERSION_OFFSET)?)
}

pub fn message_type(buffer: &[u8]) -> CodecResult<u8> {
    require_header(buffer)?;
    Ok(buffer::read_u8_at(buffer, MESSAGE_TYPE_OFFSET)?)
}

pub fn set_application_id(buffer: &mut [u8], value: u16) -> CodecResult<()> {
    require_header(buffer)?;
    Ok(buffer::write_u16_at(buffer, APPLICATION_ID_OFFSET, value)?)
}

pub fn set_application_sequence_number(buffer: &mut [u8], value: u32) -> CodecResult<()> {
    require_header(buffer)?;
    Ok(buffer::write_u32_at(
        buffer,
        APPLICATION_SEQUENCE_NUMBER_OFFSET,
        value,
    )?)
}

pub fn set_timestamp(buffer: &mut [u8], value: u64) -> CodecResult<()> {
    require_header(buffer)?;
    Ok(buffer::write_u64_at(buffer, TIMESTAMP_OFFSET, value)?)
}

pub fn set_optional_fields_index(buffer: &mut [u8], value: u16) -> CodecResult<()> {
    require_header(buffer)?;
    Ok(buffer::write_u16_at(
        buffer,
        OPTIONAL_FIELDS_INDEX_OFFSET,
        value,
    )?)
}

pub fn set_schema_version(buffer: &mut [u8], value: u8) -> CodecResult<()> {
    require_header(buffer)?;
    Ok(buffer::write_u8_at(buffer, SCHEMA_VERSION_OFFSET, value)?)
}

pub fn set_message_type(buffer: &mut [u8], value: u8) -> CodecResult<()> {
    require_header(buffer)?;
    Ok(buffer::write_u8_at(buffer, MESSAGE_TYPE_OFFSET, value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let mut buf = [0u8; HEADER_SIZE];
        set_application_id(&mut buf, 7).expect("Set app id should succeed");
        set_application_sequence_number(&mut buf, 42).expect("Set seq should succeed");
        set_timestamp(&mut buf, 1_700_000_000_000_000_000).expect("Set timestamp should succeed");
        set_optional_fields_index(&mut buf, 22).expect("Set index should succeed");
        set_schema_version(&mut buf, 3).expect("Set version should succeed");
        set_message_type(&mut buf, 0x1F).expect("Set type should succeed");

        assert_eq!(application_id(&buf).expect("Read app id"), 7);
        assert_eq!(application_sequence_number(&buf).expect("Read seq"), 42);
        assert_eq!(
            timestamp(&buf).expect("Read timestamp"),
            1_700_000_000_000_000_000
        );
        assert_eq!(optional_fields_index(&buf).expect("Read index"), 22);
        assert_eq!(schema_version(&buf).expect("Read version"), 3);
        assert_eq!(message_type(&buf).expect("Read type"), 0x1F);
    }

    #[test]
    fn test_header_layout_is_fixed() {
        let mut buf = [0u8; HEADER_SIZE];
        set_application_id(&mut buf, 0x0201).expect("Set app id should succeed");
        set_message_type(&mut buf, 0x7E).expect("Set type should succeed");
        assert_eq!(&buf[..2], &[0x01, 0x02]);
        assert_eq!(buf[17], 0x7E);
    }

    #[test]
    fn test_short_buffer_is_malformed() {
        let buf = [0u8; HEADER_SIZE - 1];
        let err = message_type(&buf).unwrap_err();
        assert!(matches!(err, CodecError::Malformed { .. }));
    }
}
