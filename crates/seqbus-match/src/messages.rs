// @generated by seqbus-gen from the Match schema. Do not edit.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::all)]

use seqbus::bus::{EventHandler, MessagePublisher, PublishError};
use seqbus::codec::{header, tlv, CodecError, OptionalCache};

/// Compiled schema version.
pub const SCHEMA_VERSION: u8 = 1;
/// Schema prefix.
pub const SCHEMA_PREFIX: &str = "Match";
/// Schema properties, in declaration order.
pub const PROPERTIES: &[(&str, &str)] = &[("owner", "matching"), ];

macro_rules! impl_get_le {
    ($name:ident, $type:ty, $size:expr) => {
        #[inline]
        fn $name(buffer: &[u8], offset: usize) -> $type {
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(&buffer[offset..offset + $size]);
            <$type>::from_le_bytes(bytes)
        }
    };
}

macro_rules! impl_put_le {
    ($name:ident, $type:ty, $size:expr) => {
        #[inline]
        fn $name(buffer: &mut [u8], offset: usize, value: $type) {
            buffer[offset..offset + $size].copy_from_slice(&value.to_le_bytes());
        }
    };
}

impl_get_le!(get_u16, u16, 2);
impl_get_le!(get_i16, i16, 2);
impl_get_le!(get_i32, i32, 4);
impl_get_le!(get_u32, u32, 4);
impl_get_le!(get_i64, i64, 8);
impl_get_le!(get_u64, u64, 8);
impl_get_le!(get_f32, f32, 4);
impl_get_le!(get_f64, f64, 8);

#[inline]
fn get_u8(buffer: &[u8], offset: usize) -> u8 {
    buffer[offset]
}

impl_put_le!(put_u16, u16, 2);
impl_put_le!(put_i16, i16, 2);
impl_put_le!(put_i32, i32, 4);
impl_put_le!(put_u32, u32, 4);
impl_put_le!(put_i64, i64, 8);
impl_put_le!(put_u64, u64, 8);
impl_put_le!(put_f32, f32, 4);
impl_put_le!(put_f64, f64, 8);

#[inline]
fn put_u8(buffer: &mut [u8], offset: usize, value: u8) {
    buffer[offset] = value;
}

/// Message type bytes.
pub mod message_type {
    pub const APPLICATION_DEFINITION: u8 = 1;
    pub const HEARTBEAT: u8 = 2;
    pub const SEQUENCER_REJECT: u8 = 3;
    pub const EQUITY_DEFINITION: u8 = 10;
    pub const ADD_ORDER_COMMAND: u8 = 20;
    pub const CANCEL_ORDER_COMMAND: u8 = 21;
    pub const ADD_ORDER: u8 = 30;
    pub const FILL_ORDER: u8 = 31;
    pub const CANCEL_ORDER: u8 = 32;
    pub const REJECT_ORDER: u8 = 33;
    pub const REJECT_CANCEL: u8 = 34;
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Side {
    Buy = 1,
    Sell = 2,
}

impl Side {
    /// Decode a wire byte; `None` for unknown values.
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Buy),
            2 => Some(Self::Sell),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Names a publisher; the sequencer assigns its application id.
///
/// `ApplicationDefinition` encoder (zero-copy).
pub struct ApplicationDefinitionEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> ApplicationDefinitionEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::APPLICATION_DEFINITION;
    pub const FIXED_SIZE: usize = 18;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    /// Append optional `name`.
    pub fn set_name(&mut self, value: &[u8]) -> Result<&mut Self, CodecError> {
        self.limit += tlv::write_tlv(self.buffer, self.limit, 1, value)?;
        Ok(self)
    }
}

/// `ApplicationDefinition` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct ApplicationDefinitionDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> ApplicationDefinitionDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::APPLICATION_DEFINITION;
    pub const FIXED_SIZE: usize = 18;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    /// True when optional `name` was encoded.
    pub fn has_name(&mut self) -> Result<bool, CodecError> {
        let index = usize::from(self.optional_fields_index());
        Ok(self.optionals.find(self.buffer, index, 1)?.is_some())
    }

    pub fn name(&mut self) -> Result<Option<&'a [u8]>, CodecError> {
        let index = usize::from(self.optional_fields_index());
        match self.optionals.find(self.buffer, index, 1)? {
            Some((offset, len)) => Ok(Some(&self.buffer[offset..offset + len])),
            None => Ok(None),
        }
    }
}

/// Echoed by the sequencer.
///
/// `Heartbeat` encoder (zero-copy).
pub struct HeartbeatEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> HeartbeatEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::HEARTBEAT;
    pub const FIXED_SIZE: usize = 18;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }
}

/// `Heartbeat` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct HeartbeatDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> HeartbeatDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::HEARTBEAT;
    pub const FIXED_SIZE: usize = 18;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }
}

/// Admission or handler failure; embeds the offending command.
///
/// `SequencerReject` encoder (zero-copy).
pub struct SequencerRejectEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> SequencerRejectEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::SEQUENCER_REJECT;
    pub const FIXED_SIZE: usize = 18;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    /// Append optional `reason`.
    pub fn set_reason(&mut self, value: &[u8]) -> Result<&mut Self, CodecError> {
        self.limit += tlv::write_tlv(self.buffer, self.limit, 1, value)?;
        Ok(self)
    }

    /// Append optional `command`.
    pub fn set_command(&mut self, value: &[u8]) -> Result<&mut Self, CodecError> {
        self.limit += tlv::write_tlv(self.buffer, self.limit, 2, value)?;
        Ok(self)
    }
}

/// `SequencerReject` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct SequencerRejectDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> SequencerRejectDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::SEQUENCER_REJECT;
    pub const FIXED_SIZE: usize = 18;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    /// True when optional `reason` was encoded.
    pub fn has_reason(&mut self) -> Result<bool, CodecError> {
        let index = usize::from(self.optional_fields_index());
        Ok(self.optionals.find(self.buffer, index, 1)?.is_some())
    }

    pub fn reason(&mut self) -> Result<Option<&'a [u8]>, CodecError> {
        let index = usize::from(self.optional_fields_index());
        match self.optionals.find(self.buffer, index, 1)? {
            Some((offset, len)) => Ok(Some(&self.buffer[offset..offset + len])),
            None => Ok(None),
        }
    }

    /// True when optional `command` was encoded.
    pub fn has_command(&mut self) -> Result<bool, CodecError> {
        let index = usize::from(self.optional_fields_index());
        Ok(self.optionals.find(self.buffer, index, 2)?.is_some())
    }

    pub fn command(&mut self) -> Result<Option<&'a [u8]>, CodecError> {
        let index = usize::from(self.optional_fields_index());
        match self.optionals.find(self.buffer, index, 2)? {
            Some((offset, len)) => Ok(Some(&self.buffer[offset..offset + len])),
            None => Ok(None),
        }
    }
}

/// Defines a tradable instrument; the sequencer assigns its id.
///
/// `EquityDefinition` encoder (zero-copy).
pub struct EquityDefinitionEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> EquityDefinitionEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::EQUITY_DEFINITION;
    pub const FIXED_SIZE: usize = 22;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    pub fn set_instrument_id(&mut self, value: i32) -> &mut Self {
        put_i32(self.buffer, 18, value);
        self
    }

    /// Append optional `symbol`.
    pub fn set_symbol(&mut self, value: &[u8]) -> Result<&mut Self, CodecError> {
        self.limit += tlv::write_tlv(self.buffer, self.limit, 1, value)?;
        Ok(self)
    }
}

/// `EquityDefinition` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct EquityDefinitionDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> EquityDefinitionDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::EQUITY_DEFINITION;
    pub const FIXED_SIZE: usize = 22;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    pub fn instrument_id(&self) -> i32 {
        get_i32(self.buffer, 18)
    }

    /// True when optional `symbol` was encoded.
    pub fn has_symbol(&mut self) -> Result<bool, CodecError> {
        let index = usize::from(self.optional_fields_index());
        Ok(self.optionals.find(self.buffer, index, 1)?.is_some())
    }

    pub fn symbol(&mut self) -> Result<Option<&'a [u8]>, CodecError> {
        let index = usize::from(self.optional_fields_index());
        match self.optionals.find(self.buffer, index, 1)? {
            Some((offset, len)) => Ok(Some(&self.buffer[offset..offset + len])),
            None => Ok(None),
        }
    }
}

/// Submit a new order.
///
/// `AddOrderCommand` encoder (zero-copy).
pub struct AddOrderCommandEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> AddOrderCommandEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::ADD_ORDER_COMMAND;
    pub const FIXED_SIZE: usize = 35;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    pub fn set_side(&mut self, value: Side) -> &mut Self {
        put_u8(self.buffer, 18, value.to_byte());
        self
    }

    /// Raw wire byte for `side`.
    pub fn set_side_raw(&mut self, value: u8) -> &mut Self {
        put_u8(self.buffer, 18, value);
        self
    }

    pub fn set_quantity(&mut self, value: i32) -> &mut Self {
        put_i32(self.buffer, 19, value);
        self
    }

    pub fn set_instrument_id(&mut self, value: i32) -> &mut Self {
        put_i32(self.buffer, 23, value);
        self
    }

    /// Value scaled by 10^4 (implied decimals).
    pub fn set_price(&mut self, value: i64) -> &mut Self {
        put_i64(self.buffer, 27, value);
        self
    }
}

/// `AddOrderCommand` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct AddOrderCommandDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> AddOrderCommandDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::ADD_ORDER_COMMAND;
    pub const FIXED_SIZE: usize = 35;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    pub fn side(&self) -> Option<Side> {
        Side::from_byte(get_u8(self.buffer, 18))
    }

    /// Raw wire byte for `side`.
    pub fn side_raw(&self) -> u8 {
        get_u8(self.buffer, 18)
    }

    pub fn quantity(&self) -> i32 {
        get_i32(self.buffer, 19)
    }

    pub fn instrument_id(&self) -> i32 {
        get_i32(self.buffer, 23)
    }

    /// Value scaled by 10^4 (implied decimals).
    pub fn price(&self) -> i64 {
        get_i64(self.buffer, 27)
    }
}

/// Cancel a resting order.
///
/// `CancelOrderCommand` encoder (zero-copy).
pub struct CancelOrderCommandEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> CancelOrderCommandEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::CANCEL_ORDER_COMMAND;
    pub const FIXED_SIZE: usize = 26;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    pub fn set_order_id(&mut self, value: i64) -> &mut Self {
        put_i64(self.buffer, 18, value);
        self
    }
}

/// `CancelOrderCommand` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct CancelOrderCommandDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> CancelOrderCommandDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::CANCEL_ORDER_COMMAND;
    pub const FIXED_SIZE: usize = 26;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    pub fn order_id(&self) -> i64 {
        get_i64(self.buffer, 18)
    }
}

/// Order accepted onto the book.
///
/// `AddOrder` encoder (zero-copy).
pub struct AddOrderEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> AddOrderEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::ADD_ORDER;
    pub const FIXED_SIZE: usize = 43;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    pub fn set_order_id(&mut self, value: i64) -> &mut Self {
        put_i64(self.buffer, 18, value);
        self
    }

    pub fn set_side(&mut self, value: Side) -> &mut Self {
        put_u8(self.buffer, 26, value.to_byte());
        self
    }

    /// Raw wire byte for `side`.
    pub fn set_side_raw(&mut self, value: u8) -> &mut Self {
        put_u8(self.buffer, 26, value);
        self
    }

    pub fn set_quantity(&mut self, value: i32) -> &mut Self {
        put_i32(self.buffer, 27, value);
        self
    }

    pub fn set_instrument_id(&mut self, value: i32) -> &mut Self {
        put_i32(self.buffer, 31, value);
        self
    }

    /// Value scaled by 10^4 (implied decimals).
    pub fn set_price(&mut self, value: i64) -> &mut Self {
        put_i64(self.buffer, 35, value);
        self
    }
}

/// `AddOrder` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct AddOrderDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> AddOrderDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::ADD_ORDER;
    pub const FIXED_SIZE: usize = 43;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    pub fn order_id(&self) -> i64 {
        get_i64(self.buffer, 18)
    }

    pub fn side(&self) -> Option<Side> {
        Side::from_byte(get_u8(self.buffer, 26))
    }

    /// Raw wire byte for `side`.
    pub fn side_raw(&self) -> u8 {
        get_u8(self.buffer, 26)
    }

    pub fn quantity(&self) -> i32 {
        get_i32(self.buffer, 27)
    }

    pub fn instrument_id(&self) -> i32 {
        get_i32(self.buffer, 31)
    }

    /// Value scaled by 10^4 (implied decimals).
    pub fn price(&self) -> i64 {
        get_i64(self.buffer, 35)
    }
}

/// One side of a match.
///
/// `FillOrder` encoder (zero-copy).
pub struct FillOrderEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> FillOrderEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::FILL_ORDER;
    pub const FIXED_SIZE: usize = 50;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    pub fn set_order_id(&mut self, value: i64) -> &mut Self {
        put_i64(self.buffer, 18, value);
        self
    }

    pub fn set_counterparty_order_id(&mut self, value: i64) -> &mut Self {
        put_i64(self.buffer, 26, value);
        self
    }

    /// Value scaled by 10^4 (implied decimals).
    pub fn set_price(&mut self, value: i64) -> &mut Self {
        put_i64(self.buffer, 34, value);
        self
    }

    pub fn set_fill_quantity(&mut self, value: i32) -> &mut Self {
        put_i32(self.buffer, 42, value);
        self
    }

    pub fn set_remaining_quantity(&mut self, value: i32) -> &mut Self {
        put_i32(self.buffer, 46, value);
        self
    }
}

/// `FillOrder` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct FillOrderDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> FillOrderDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::FILL_ORDER;
    pub const FIXED_SIZE: usize = 50;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    pub fn order_id(&self) -> i64 {
        get_i64(self.buffer, 18)
    }

    pub fn counterparty_order_id(&self) -> i64 {
        get_i64(self.buffer, 26)
    }

    /// Value scaled by 10^4 (implied decimals).
    pub fn price(&self) -> i64 {
        get_i64(self.buffer, 34)
    }

    pub fn fill_quantity(&self) -> i32 {
        get_i32(self.buffer, 42)
    }

    pub fn remaining_quantity(&self) -> i32 {
        get_i32(self.buffer, 46)
    }
}

/// Order removed from the book.
///
/// `CancelOrder` encoder (zero-copy).
pub struct CancelOrderEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> CancelOrderEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::CANCEL_ORDER;
    pub const FIXED_SIZE: usize = 26;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    pub fn set_order_id(&mut self, value: i64) -> &mut Self {
        put_i64(self.buffer, 18, value);
        self
    }
}

/// `CancelOrder` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct CancelOrderDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> CancelOrderDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::CANCEL_ORDER;
    pub const FIXED_SIZE: usize = 26;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    pub fn order_id(&self) -> i64 {
        get_i64(self.buffer, 18)
    }
}

/// Order validation failure.
///
/// `RejectOrder` encoder (zero-copy).
pub struct RejectOrderEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> RejectOrderEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::REJECT_ORDER;
    pub const FIXED_SIZE: usize = 18;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    /// Append optional `reason`.
    pub fn set_reason(&mut self, value: &[u8]) -> Result<&mut Self, CodecError> {
        self.limit += tlv::write_tlv(self.buffer, self.limit, 1, value)?;
        Ok(self)
    }
}

/// `RejectOrder` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct RejectOrderDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> RejectOrderDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::REJECT_ORDER;
    pub const FIXED_SIZE: usize = 18;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    /// True when optional `reason` was encoded.
    pub fn has_reason(&mut self) -> Result<bool, CodecError> {
        let index = usize::from(self.optional_fields_index());
        Ok(self.optionals.find(self.buffer, index, 1)?.is_some())
    }

    pub fn reason(&mut self) -> Result<Option<&'a [u8]>, CodecError> {
        let index = usize::from(self.optional_fields_index());
        match self.optionals.find(self.buffer, index, 1)? {
            Some((offset, len)) => Ok(Some(&self.buffer[offset..offset + len])),
            None => Ok(None),
        }
    }
}

/// Cancel validation failure.
///
/// `RejectCancel` encoder (zero-copy).
pub struct RejectCancelEncoder<'a> {
    buffer: &'a mut [u8],
    limit: usize,
}

impl<'a> RejectCancelEncoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::REJECT_CANCEL;
    pub const FIXED_SIZE: usize = 26;

    /// Wrap `buffer`, zero the fixed region, and stamp the envelope.
    pub fn wrap(buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        buffer[..Self::FIXED_SIZE].fill(0);
        header::set_message_type(buffer, Self::MESSAGE_TYPE)?;
        header::set_schema_version(buffer, SCHEMA_VERSION)?;
        header::set_optional_fields_index(buffer, Self::FIXED_SIZE as u16)?;
        Ok(Self {
            buffer,
            limit: Self::FIXED_SIZE,
        })
    }

    /// Total encoded length: fixed region plus appended optionals.
    pub fn encoded_length(&self) -> usize {
        self.limit
    }

    pub fn set_order_id(&mut self, value: i64) -> &mut Self {
        put_i64(self.buffer, 18, value);
        self
    }

    /// Append optional `reason`.
    pub fn set_reason(&mut self, value: &[u8]) -> Result<&mut Self, CodecError> {
        self.limit += tlv::write_tlv(self.buffer, self.limit, 1, value)?;
        Ok(self)
    }
}

/// `RejectCancel` decoder (zero-copy; optionals scanned lazily and cached per wrap).
#[derive(Debug)]
pub struct RejectCancelDecoder<'a> {
    buffer: &'a [u8],
    optionals: OptionalCache,
}

impl<'a> RejectCancelDecoder<'a> {
    pub const MESSAGE_TYPE: u8 = message_type::REJECT_CANCEL;
    pub const FIXED_SIZE: usize = 26;

    pub fn wrap(buffer: &'a [u8]) -> Result<Self, CodecError> {
        if buffer.len() < Self::FIXED_SIZE {
            return Err(CodecError::Malformed {
                offset: buffer.len(),
                reason: "buffer shorter than fixed size",
            });
        }
        Ok(Self {
            buffer,
            optionals: OptionalCache::new(),
        })
    }

    /// The wrapped bytes.
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    pub fn application_id(&self) -> u16 {
        get_u16(self.buffer, header::APPLICATION_ID_OFFSET)
    }

    pub fn application_sequence_number(&self) -> u32 {
        get_u32(self.buffer, header::APPLICATION_SEQUENCE_NUMBER_OFFSET)
    }

    pub fn timestamp(&self) -> u64 {
        get_u64(self.buffer, header::TIMESTAMP_OFFSET)
    }

    pub fn optional_fields_index(&self) -> u16 {
        get_u16(self.buffer, header::OPTIONAL_FIELDS_INDEX_OFFSET)
    }

    pub fn schema_version(&self) -> u8 {
        get_u8(self.buffer, header::SCHEMA_VERSION_OFFSET)
    }

    pub fn message_type(&self) -> u8 {
        get_u8(self.buffer, header::MESSAGE_TYPE_OFFSET)
    }

    pub fn order_id(&self) -> i64 {
        get_i64(self.buffer, 18)
    }

    /// True when optional `reason` was encoded.
    pub fn has_reason(&mut self) -> Result<bool, CodecError> {
        let index = usize::from(self.optional_fields_index());
        Ok(self.optionals.find(self.buffer, index, 1)?.is_some())
    }

    pub fn reason(&mut self) -> Result<Option<&'a [u8]>, CodecError> {
        let index = usize::from(self.optional_fields_index());
        match self.optionals.find(self.buffer, index, 1)? {
            Some((offset, len)) => Ok(Some(&self.buffer[offset..offset + len])),
            None => Ok(None),
        }
    }
}

/// Tagged view over any Match message, decoder side.
#[derive(Debug)]
pub enum MatchMessage<'a> {
    ApplicationDefinition(ApplicationDefinitionDecoder<'a>),
    Heartbeat(HeartbeatDecoder<'a>),
    SequencerReject(SequencerRejectDecoder<'a>),
    EquityDefinition(EquityDefinitionDecoder<'a>),
    AddOrderCommand(AddOrderCommandDecoder<'a>),
    CancelOrderCommand(CancelOrderCommandDecoder<'a>),
    AddOrder(AddOrderDecoder<'a>),
    FillOrder(FillOrderDecoder<'a>),
    CancelOrder(CancelOrderDecoder<'a>),
    RejectOrder(RejectOrderDecoder<'a>),
    RejectCancel(RejectCancelDecoder<'a>),
}

impl<'a> MatchMessage<'a> {
    /// Wrap by the header's message type; `None` for unknown types.
    pub fn wrap(buffer: &'a [u8]) -> Result<Option<Self>, CodecError> {
        match header::message_type(buffer)? {
            message_type::APPLICATION_DEFINITION => Ok(Some(Self::ApplicationDefinition(ApplicationDefinitionDecoder::wrap(buffer)?))),
            message_type::HEARTBEAT => Ok(Some(Self::Heartbeat(HeartbeatDecoder::wrap(buffer)?))),
            message_type::SEQUENCER_REJECT => Ok(Some(Self::SequencerReject(SequencerRejectDecoder::wrap(buffer)?))),
            message_type::EQUITY_DEFINITION => Ok(Some(Self::EquityDefinition(EquityDefinitionDecoder::wrap(buffer)?))),
            message_type::ADD_ORDER_COMMAND => Ok(Some(Self::AddOrderCommand(AddOrderCommandDecoder::wrap(buffer)?))),
            message_type::CANCEL_ORDER_COMMAND => Ok(Some(Self::CancelOrderCommand(CancelOrderCommandDecoder::wrap(buffer)?))),
            message_type::ADD_ORDER => Ok(Some(Self::AddOrder(AddOrderDecoder::wrap(buffer)?))),
            message_type::FILL_ORDER => Ok(Some(Self::FillOrder(FillOrderDecoder::wrap(buffer)?))),
            message_type::CANCEL_ORDER => Ok(Some(Self::CancelOrder(CancelOrderDecoder::wrap(buffer)?))),
            message_type::REJECT_ORDER => Ok(Some(Self::RejectOrder(RejectOrderDecoder::wrap(buffer)?))),
            message_type::REJECT_CANCEL => Ok(Some(Self::RejectCancel(RejectCancelDecoder::wrap(buffer)?))),
            _ => Ok(None),
        }
    }

    /// Wrap as `name`; unknown names are `BadMessageName`.
    pub fn wrap_as(name: &str, buffer: &'a [u8]) -> Result<Self, CodecError> {
        match name {
            "ApplicationDefinition" => Ok(Self::ApplicationDefinition(ApplicationDefinitionDecoder::wrap(buffer)?)),
            "Heartbeat" => Ok(Self::Heartbeat(HeartbeatDecoder::wrap(buffer)?)),
            "SequencerReject" => Ok(Self::SequencerReject(SequencerRejectDecoder::wrap(buffer)?)),
            "EquityDefinition" => Ok(Self::EquityDefinition(EquityDefinitionDecoder::wrap(buffer)?)),
            "AddOrderCommand" => Ok(Self::AddOrderCommand(AddOrderCommandDecoder::wrap(buffer)?)),
            "CancelOrderCommand" => Ok(Self::CancelOrderCommand(CancelOrderCommandDecoder::wrap(buffer)?)),
            "AddOrder" => Ok(Self::AddOrder(AddOrderDecoder::wrap(buffer)?)),
            "FillOrder" => Ok(Self::FillOrder(FillOrderDecoder::wrap(buffer)?)),
            "CancelOrder" => Ok(Self::CancelOrder(CancelOrderDecoder::wrap(buffer)?)),
            "RejectOrder" => Ok(Self::RejectOrder(RejectOrderDecoder::wrap(buffer)?)),
            "RejectCancel" => Ok(Self::RejectCancel(RejectCancelDecoder::wrap(buffer)?)),
            _ => Err(CodecError::BadMessageName {
                name: name.to_string(),
            }),
        }
    }

    pub fn message_type(&self) -> u8 {
        match self {
            Self::ApplicationDefinition(_) => message_type::APPLICATION_DEFINITION,
            Self::Heartbeat(_) => message_type::HEARTBEAT,
            Self::SequencerReject(_) => message_type::SEQUENCER_REJECT,
            Self::EquityDefinition(_) => message_type::EQUITY_DEFINITION,
            Self::AddOrderCommand(_) => message_type::ADD_ORDER_COMMAND,
            Self::CancelOrderCommand(_) => message_type::CANCEL_ORDER_COMMAND,
            Self::AddOrder(_) => message_type::ADD_ORDER,
            Self::FillOrder(_) => message_type::FILL_ORDER,
            Self::CancelOrder(_) => message_type::CANCEL_ORDER,
            Self::RejectOrder(_) => message_type::REJECT_ORDER,
            Self::RejectCancel(_) => message_type::REJECT_CANCEL,
        }
    }
}

/// Tagged view over any Match message, encoder side.
pub enum MatchMessageEncoder<'a> {
    ApplicationDefinition(ApplicationDefinitionEncoder<'a>),
    Heartbeat(HeartbeatEncoder<'a>),
    SequencerReject(SequencerRejectEncoder<'a>),
    EquityDefinition(EquityDefinitionEncoder<'a>),
    AddOrderCommand(AddOrderCommandEncoder<'a>),
    CancelOrderCommand(CancelOrderCommandEncoder<'a>),
    AddOrder(AddOrderEncoder<'a>),
    FillOrder(FillOrderEncoder<'a>),
    CancelOrder(CancelOrderEncoder<'a>),
    RejectOrder(RejectOrderEncoder<'a>),
    RejectCancel(RejectCancelEncoder<'a>),
}

impl<'a> MatchMessageEncoder<'a> {
    /// Wrap `buffer` as `name`; unknown names are `BadMessageName`.
    pub fn wrap_as(name: &str, buffer: &'a mut [u8]) -> Result<Self, CodecError> {
        match name {
            "ApplicationDefinition" => Ok(Self::ApplicationDefinition(ApplicationDefinitionEncoder::wrap(buffer)?)),
            "Heartbeat" => Ok(Self::Heartbeat(HeartbeatEncoder::wrap(buffer)?)),
            "SequencerReject" => Ok(Self::SequencerReject(SequencerRejectEncoder::wrap(buffer)?)),
            "EquityDefinition" => Ok(Self::EquityDefinition(EquityDefinitionEncoder::wrap(buffer)?)),
            "AddOrderCommand" => Ok(Self::AddOrderCommand(AddOrderCommandEncoder::wrap(buffer)?)),
            "CancelOrderCommand" => Ok(Self::CancelOrderCommand(CancelOrderCommandEncoder::wrap(buffer)?)),
            "AddOrder" => Ok(Self::AddOrder(AddOrderEncoder::wrap(buffer)?)),
            "FillOrder" => Ok(Self::FillOrder(FillOrderEncoder::wrap(buffer)?)),
            "CancelOrder" => Ok(Self::CancelOrder(CancelOrderEncoder::wrap(buffer)?)),
            "RejectOrder" => Ok(Self::RejectOrder(RejectOrderEncoder::wrap(buffer)?)),
            "RejectCancel" => Ok(Self::RejectCancel(RejectCancelEncoder::wrap(buffer)?)),
            _ => Err(CodecError::BadMessageName {
                name: name.to_string(),
            }),
        }
    }

    pub fn encoded_length(&self) -> usize {
        match self {
            Self::ApplicationDefinition(encoder) => encoder.encoded_length(),
            Self::Heartbeat(encoder) => encoder.encoded_length(),
            Self::SequencerReject(encoder) => encoder.encoded_length(),
            Self::EquityDefinition(encoder) => encoder.encoded_length(),
            Self::AddOrderCommand(encoder) => encoder.encoded_length(),
            Self::CancelOrderCommand(encoder) => encoder.encoded_length(),
            Self::AddOrder(encoder) => encoder.encoded_length(),
            Self::FillOrder(encoder) => encoder.encoded_length(),
            Self::CancelOrder(encoder) => encoder.encoded_length(),
            Self::RejectOrder(encoder) => encoder.encoded_length(),
            Self::RejectCancel(encoder) => encoder.encoded_length(),
        }
    }
}

/// Schema facade: names, type bytes, header geometry.
pub struct MatchSchema;

impl MatchSchema {
    pub const VERSION: u8 = SCHEMA_VERSION;

    pub const APPLICATION_ID_OFFSET: usize = 0;
    pub const APPLICATION_SEQUENCE_NUMBER_OFFSET: usize = 2;
    pub const TIMESTAMP_OFFSET: usize = 6;
    pub const OPTIONAL_FIELDS_INDEX_OFFSET: usize = 14;
    pub const SCHEMA_VERSION_OFFSET: usize = 16;
    pub const MESSAGE_TYPE_OFFSET: usize = 17;

    pub fn message_names() -> &'static [&'static str] {
        &["ApplicationDefinition", "Heartbeat", "SequencerReject", "EquityDefinition", "AddOrderCommand", "CancelOrderCommand", "AddOrder", "FillOrder", "CancelOrder", "RejectOrder", "RejectCancel", ]
    }

    /// Type byte for `name`; unknown names are `BadMessageName`.
    pub fn message_type(name: &str) -> Result<u8, CodecError> {
        match name {
            "ApplicationDefinition" => Ok(message_type::APPLICATION_DEFINITION),
            "Heartbeat" => Ok(message_type::HEARTBEAT),
            "SequencerReject" => Ok(message_type::SEQUENCER_REJECT),
            "EquityDefinition" => Ok(message_type::EQUITY_DEFINITION),
            "AddOrderCommand" => Ok(message_type::ADD_ORDER_COMMAND),
            "CancelOrderCommand" => Ok(message_type::CANCEL_ORDER_COMMAND),
            "AddOrder" => Ok(message_type::ADD_ORDER),
            "FillOrder" => Ok(message_type::FILL_ORDER),
            "CancelOrder" => Ok(message_type::CANCEL_ORDER),
            "RejectOrder" => Ok(message_type::REJECT_ORDER),
            "RejectCancel" => Ok(message_type::REJECT_CANCEL),
            _ => Err(CodecError::BadMessageName {
                name: name.to_string(),
            }),
        }
    }

    pub fn message_name(message_type: u8) -> Option<&'static str> {
        match message_type {
            message_type::APPLICATION_DEFINITION => Some("ApplicationDefinition"),
            message_type::HEARTBEAT => Some("Heartbeat"),
            message_type::SEQUENCER_REJECT => Some("SequencerReject"),
            message_type::EQUITY_DEFINITION => Some("EquityDefinition"),
            message_type::ADD_ORDER_COMMAND => Some("AddOrderCommand"),
            message_type::CANCEL_ORDER_COMMAND => Some("CancelOrderCommand"),
            message_type::ADD_ORDER => Some("AddOrder"),
            message_type::FILL_ORDER => Some("FillOrder"),
            message_type::CANCEL_ORDER => Some("CancelOrder"),
            message_type::REJECT_ORDER => Some("RejectOrder"),
            message_type::REJECT_CANCEL => Some("RejectCancel"),
            _ => None,
        }
    }

    pub fn properties() -> &'static [(&'static str, &'static str)] {
        PROPERTIES
    }

    /// Fresh decoder for the message named `name`.
    pub fn decoder_for<'a>(name: &str, buffer: &'a [u8]) -> Result<MatchMessage<'a>, CodecError> {
        MatchMessage::wrap_as(name, buffer)
    }

    /// Fresh encoder for the message named `name`.
    pub fn encoder_for<'a>(
        name: &str,
        buffer: &'a mut [u8],
    ) -> Result<MatchMessageEncoder<'a>, CodecError> {
        MatchMessageEncoder::wrap_as(name, buffer)
    }

    pub fn dispatcher() -> MatchDispatcher {
        MatchDispatcher::new()
    }

    pub fn provider<P: MessagePublisher>(publisher: P) -> MatchProvider<P> {
        MatchProvider::new(publisher)
    }
}

/// `ApplicationDefinition` listener.
pub type ApplicationDefinitionListener = Box<dyn FnMut(&mut ApplicationDefinitionDecoder<'_>)>;
/// `Heartbeat` listener.
pub type HeartbeatListener = Box<dyn FnMut(&mut HeartbeatDecoder<'_>)>;
/// `SequencerReject` listener.
pub type SequencerRejectListener = Box<dyn FnMut(&mut SequencerRejectDecoder<'_>)>;
/// `EquityDefinition` listener.
pub type EquityDefinitionListener = Box<dyn FnMut(&mut EquityDefinitionDecoder<'_>)>;
/// `AddOrderCommand` listener.
pub type AddOrderCommandListener = Box<dyn FnMut(&mut AddOrderCommandDecoder<'_>)>;
/// `CancelOrderCommand` listener.
pub type CancelOrderCommandListener = Box<dyn FnMut(&mut CancelOrderCommandDecoder<'_>)>;
/// `AddOrder` listener.
pub type AddOrderListener = Box<dyn FnMut(&mut AddOrderDecoder<'_>)>;
/// `FillOrder` listener.
pub type FillOrderListener = Box<dyn FnMut(&mut FillOrderDecoder<'_>)>;
/// `CancelOrder` listener.
pub type CancelOrderListener = Box<dyn FnMut(&mut CancelOrderDecoder<'_>)>;
/// `RejectOrder` listener.
pub type RejectOrderListener = Box<dyn FnMut(&mut RejectOrderDecoder<'_>)>;
/// `RejectCancel` listener.
pub type RejectCancelListener = Box<dyn FnMut(&mut RejectCancelDecoder<'_>)>;
/// Raw-buffer listener run around every event.
pub type GlobalListener = Box<dyn FnMut(&[u8])>;

/// Routes events to typed listeners by message type.
///
/// Global before-listeners run first, then per-type listeners, then global
/// after-listeners, each in registration order. Unknown message types are
/// ignored.
pub struct MatchDispatcher {
    before: Vec<GlobalListener>,
    after: Vec<GlobalListener>,
    application_definition: Vec<ApplicationDefinitionListener>,
    heartbeat: Vec<HeartbeatListener>,
    sequencer_reject: Vec<SequencerRejectListener>,
    equity_definition: Vec<EquityDefinitionListener>,
    add_order_command: Vec<AddOrderCommandListener>,
    cancel_order_command: Vec<CancelOrderCommandListener>,
    add_order: Vec<AddOrderListener>,
    fill_order: Vec<FillOrderListener>,
    cancel_order: Vec<CancelOrderListener>,
    reject_order: Vec<RejectOrderListener>,
    reject_cancel: Vec<RejectCancelListener>,
}

impl MatchDispatcher {
    pub fn new() -> Self {
        Self {
            before: Vec::new(),
            after: Vec::new(),
            application_definition: Vec::new(),
            heartbeat: Vec::new(),
            sequencer_reject: Vec::new(),
            equity_definition: Vec::new(),
            add_order_command: Vec::new(),
            cancel_order_command: Vec::new(),
            add_order: Vec::new(),
            fill_order: Vec::new(),
            cancel_order: Vec::new(),
            reject_order: Vec::new(),
            reject_cancel: Vec::new(),
        }
    }

    pub fn add_before_listener(&mut self, listener: GlobalListener) {
        self.before.push(listener);
    }

    pub fn add_after_listener(&mut self, listener: GlobalListener) {
        self.after.push(listener);
    }

    pub fn add_application_definition_listener(&mut self, listener: ApplicationDefinitionListener) {
        self.application_definition.push(listener);
    }

    pub fn add_heartbeat_listener(&mut self, listener: HeartbeatListener) {
        self.heartbeat.push(listener);
    }

    pub fn add_sequencer_reject_listener(&mut self, listener: SequencerRejectListener) {
        self.sequencer_reject.push(listener);
    }

    pub fn add_equity_definition_listener(&mut self, listener: EquityDefinitionListener) {
        self.equity_definition.push(listener);
    }

    pub fn add_add_order_command_listener(&mut self, listener: AddOrderCommandListener) {
        self.add_order_command.push(listener);
    }

    pub fn add_cancel_order_command_listener(&mut self, listener: CancelOrderCommandListener) {
        self.cancel_order_command.push(listener);
    }

    pub fn add_add_order_listener(&mut self, listener: AddOrderListener) {
        self.add_order.push(listener);
    }

    pub fn add_fill_order_listener(&mut self, listener: FillOrderListener) {
        self.fill_order.push(listener);
    }

    pub fn add_cancel_order_listener(&mut self, listener: CancelOrderListener) {
        self.cancel_order.push(listener);
    }

    pub fn add_reject_order_listener(&mut self, listener: RejectOrderListener) {
        self.reject_order.push(listener);
    }

    pub fn add_reject_cancel_listener(&mut self, listener: RejectCancelListener) {
        self.reject_cancel.push(listener);
    }

    /// Dispatch one event.
    pub fn dispatch(&mut self, buffer: &[u8]) {
        let Ok(message_type) = header::message_type(buffer) else {
            return;
        };
        for listener in &mut self.before {
            listener(buffer);
        }
        match message_type {
            message_type::APPLICATION_DEFINITION => {
                if let Ok(mut decoder) = ApplicationDefinitionDecoder::wrap(buffer) {
                    for listener in &mut self.application_definition {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::HEARTBEAT => {
                if let Ok(mut decoder) = HeartbeatDecoder::wrap(buffer) {
                    for listener in &mut self.heartbeat {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::SEQUENCER_REJECT => {
                if let Ok(mut decoder) = SequencerRejectDecoder::wrap(buffer) {
                    for listener in &mut self.sequencer_reject {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::EQUITY_DEFINITION => {
                if let Ok(mut decoder) = EquityDefinitionDecoder::wrap(buffer) {
                    for listener in &mut self.equity_definition {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::ADD_ORDER_COMMAND => {
                if let Ok(mut decoder) = AddOrderCommandDecoder::wrap(buffer) {
                    for listener in &mut self.add_order_command {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::CANCEL_ORDER_COMMAND => {
                if let Ok(mut decoder) = CancelOrderCommandDecoder::wrap(buffer) {
                    for listener in &mut self.cancel_order_command {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::ADD_ORDER => {
                if let Ok(mut decoder) = AddOrderDecoder::wrap(buffer) {
                    for listener in &mut self.add_order {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::FILL_ORDER => {
                if let Ok(mut decoder) = FillOrderDecoder::wrap(buffer) {
                    for listener in &mut self.fill_order {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::CANCEL_ORDER => {
                if let Ok(mut decoder) = CancelOrderDecoder::wrap(buffer) {
                    for listener in &mut self.cancel_order {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::REJECT_ORDER => {
                if let Ok(mut decoder) = RejectOrderDecoder::wrap(buffer) {
                    for listener in &mut self.reject_order {
                        listener(&mut decoder);
                    }
                }
            }
            message_type::REJECT_CANCEL => {
                if let Ok(mut decoder) = RejectCancelDecoder::wrap(buffer) {
                    for listener in &mut self.reject_cancel {
                        listener(&mut decoder);
                    }
                }
            }
            _ => {}
        }
        for listener in &mut self.after {
            listener(buffer);
        }
    }
}

impl Default for MatchDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for MatchDispatcher {
    fn on_event(&mut self, buffer: &[u8]) {
        self.dispatch(buffer);
    }
}

/// Typed encoder facade over one publisher.
///
/// Every `*_encoder()` wraps a fresh `acquire()` buffer; commit the staged
/// message before acquiring the next one.
pub struct MatchProvider<P: MessagePublisher> {
    publisher: P,
}

impl<P: MessagePublisher> MatchProvider<P> {
    pub fn new(publisher: P) -> Self {
        Self { publisher }
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    pub fn commit(&mut self, length: usize) -> Result<(), PublishError> {
        self.publisher.commit(length)
    }

    pub fn send(&mut self) -> Result<(), PublishError> {
        self.publisher.send()
    }

    pub fn is_current(&self) -> bool {
        self.publisher.is_current()
    }

    pub fn application_definition_encoder(&mut self) -> Result<ApplicationDefinitionEncoder<'_>, CodecError> {
        ApplicationDefinitionEncoder::wrap(self.publisher.acquire())
    }

    pub fn heartbeat_encoder(&mut self) -> Result<HeartbeatEncoder<'_>, CodecError> {
        HeartbeatEncoder::wrap(self.publisher.acquire())
    }

    pub fn sequencer_reject_encoder(&mut self) -> Result<SequencerRejectEncoder<'_>, CodecError> {
        SequencerRejectEncoder::wrap(self.publisher.acquire())
    }

    pub fn equity_definition_encoder(&mut self) -> Result<EquityDefinitionEncoder<'_>, CodecError> {
        EquityDefinitionEncoder::wrap(self.publisher.acquire())
    }

    pub fn add_order_command_encoder(&mut self) -> Result<AddOrderCommandEncoder<'_>, CodecError> {
        AddOrderCommandEncoder::wrap(self.publisher.acquire())
    }

    pub fn cancel_order_command_encoder(&mut self) -> Result<CancelOrderCommandEncoder<'_>, CodecError> {
        CancelOrderCommandEncoder::wrap(self.publisher.acquire())
    }

    pub fn add_order_encoder(&mut self) -> Result<AddOrderEncoder<'_>, CodecError> {
        AddOrderEncoder::wrap(self.publisher.acquire())
    }

    pub fn fill_order_encoder(&mut self) -> Result<FillOrderEncoder<'_>, CodecError> {
        FillOrderEncoder::wrap(self.publisher.acquire())
    }

    pub fn cancel_order_encoder(&mut self) -> Result<CancelOrderEncoder<'_>, CodecError> {
        CancelOrderEncoder::wrap(self.publisher.acquire())
    }

    pub fn reject_order_encoder(&mut self) -> Result<RejectOrderEncoder<'_>, CodecError> {
        RejectOrderEncoder::wrap(self.publisher.acquire())
    }

    pub fn reject_cancel_encoder(&mut self) -> Result<RejectCancelEncoder<'_>, CodecError> {
        RejectCancelEncoder::wrap(self.publisher.acquire())
    }
}
