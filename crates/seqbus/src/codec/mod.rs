// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime half of the wire codec.
//!
//! Generated encoders and decoders are thin typed wrappers over the helpers
//! in this module: fixed-offset header access, the required-field region, and
//! TLV-encoded optional fields. The wire format is little-endian throughout.
//!
//! ```text
//! offset  field                         width
//!   0     applicationId                  2
//!   2     applicationSequenceNumber      4
//!   6     timestamp (ns since epoch)     8
//!  14     optionalFieldsIndex            2
//!  16     schemaVersion                  1
//!  17     messageType                    1
//!  18     message-specific required fields
//!   N     optional TLVs: id:1, len:1 | {0xFF, len:2 LE}, value
//! ```

/// Fixed header field offsets and accessors.
pub mod header;
/// TLV optional-field encoding and the lazy scan cache.
pub mod tlv;

use std::fmt;

use crate::core::buffer::BufferError;

/// Errors surfaced by the codec runtime and generated wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Buffer shorter than the fixed size, or a truncated TLV.
    Malformed {
        /// Byte offset of the failed access.
        offset: usize,
        /// Short ASCII reason.
        reason: &'static str,
    },
    /// Lookup of a message name the schema does not define.
    BadMessageName {
        /// The unknown name.
        name: String,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { offset, reason } => {
                write!(f, "malformed message at offset {}: {}", offset, reason)
            }
            Self::BadMessageName { name } => write!(f, "unknown message name: {}", name),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<BufferError> for CodecError {
    fn from(e: BufferError) -> Self {
        match e {
            BufferError::ReadOverflow { offset, .. } => Self::Malformed {
                offset,
                reason: "read past end of message",
            },
            BufferError::WriteOverflow { offset, .. } => Self::Malformed {
                offset,
                reason: "write past end of message",
            },
        }
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

pub use header::{
    APPLICATION_ID_OFFSET, APPLICATION_SEQUENCE_NUMBER_OFFSET, HEADER_SIZE, MESSAGE_TYPE_OFFSET,
    OPTIONAL_FIELDS_INDEX_OFFSET, SCHEMA_VERSION_OFFSET, TIMESTAMP_OFFSET,
};
pub use tlv::{OptionalCache, MAX_OPTIONAL_FIELDS};
