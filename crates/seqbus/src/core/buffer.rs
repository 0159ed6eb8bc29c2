// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Offset-addressed little-endian accessors over byte slices.
//!
//! Required message fields live at fixed byte offsets computed from the
//! schema, so all access is random rather than streaming. Every accessor is
//! bounds-checked and returns `BufferError` instead of panicking.

use std::fmt;

/// Error raised when an access falls outside the wrapped slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Read past the end of the buffer.
    ReadOverflow {
        /// Offset of the failed access.
        offset: usize,
        /// Bytes requested at that offset.
        len: usize,
        /// Total buffer capacity.
        capacity: usize,
    },
    /// Write past the end of the buffer.
    WriteOverflow {
        /// Offset of the failed access.
        offset: usize,
        /// Bytes requested at that offset.
        len: usize,
        /// Total buffer capacity.
        capacity: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOverflow {
                offset,
                len,
                capacity,
            } => write!(
                f,
                "read of {} bytes at offset {} exceeds capacity {}",
                len, offset, capacity
            ),
            Self::WriteOverflow {
                offset,
                len,
                capacity,
            } => write!(
                f,
                "write of {} bytes at offset {} exceeds capacity {}",
                len, offset, capacity
            ),
        }
    }
}

impl std::error::Error for BufferError {}

/// Result alias for buffer operations.
pub type BufferResult<T> = Result<T, BufferError>;

/// Generate offset-addressed read methods for primitive types.
///
/// Each generated method bounds-checks, copies the little-endian bytes out of
/// the slice, and converts via `from_le_bytes()`.
macro_rules! impl_read_at {
    ($name:ident, $type:ty, $size:expr) => {
        #[inline]
        pub fn $name(buffer: &[u8], offset: usize) -> BufferResult<$type> {
            let end = offset.checked_add($size).ok_or(BufferError::ReadOverflow {
                offset,
                len: $size,
                capacity: buffer.len(),
            })?;
            if end > buffer.len() {
                return Err(BufferError::ReadOverflow {
                    offset,
                    len: $size,
                    capacity: buffer.len(),
                });
            }
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(&buffer[offset..end]);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Generate offset-addressed write methods for primitive types.
macro_rules! impl_write_at {
    ($name:ident, $type:ty, $size:expr) => {
        #[inline]
        pub fn $name(buffer: &mut [u8], offset: usize, value: $type) -> BufferResult<()> {
            let end = offset
                .checked_add($size)
                .ok_or(BufferError::WriteOverflow {
                    offset,
                    len: $size,
                    capacity: buffer.len(),
                })?;
            if end > buffer.len() {
                return Err(BufferError::WriteOverflow {
                    offset,
                    len: $size,
                    capacity: buffer.len(),
                });
            }
            buffer[offset..end].copy_from_slice(&value.to_le_bytes());
            Ok(())
        }
    };
}

impl_read_at!(read_u8_at, u8, 1);
impl_read_at!(read_u16_at, u16, 2);
impl_read_at!(read_u32_at, u32, 4);
impl_read_at!(read_u64_at, u64, 8);
impl_read_at!(read_i16_at, i16, 2);
impl_read_at!(read_i32_at, i32, 4);
impl_read_at!(read_i64_at, i64, 8);

impl_write_at!(write_u8_at, u8, 1);
impl_write_at!(write_u16_at, u16, 2);
impl_write_at!(write_u32_at, u32, 4);
impl_write_at!(write_u64_at, u64, 8);
impl_write_at!(write_i16_at, i16, 2);
impl_write_at!(write_i32_at, i32, 4);
impl_write_at!(write_i64_at, i64, 8);

#[inline]
pub fn read_f32_at(buffer: &[u8], offset: usize) -> BufferResult<f32> {
    Ok(f32::from_bits(read_u32_at(buffer, offset)?))
}

#[inline]
pub fn read_f64_at(buffer: &[u8], offset: usize) -> BufferResult<f64> {
    Ok(f64::from_bits(read_u64_at(buffer, offset)?))
}

#[inline]
pub fn write_f32_at(buffer: &mut [u8], offset: usize, value: f32) -> BufferResult<()> {
    write_u32_at(buffer, offset, value.to_bits())
}

#[inline]
pub fn write_f64_at(buffer: &mut [u8], offset: usize, value: f64) -> BufferResult<()> {
    write_u64_at(buffer, offset, value.to_bits())
}

/// Read `len` bytes starting at `offset`.
#[inline]
pub fn read_bytes_at(buffer: &[u8], offset: usize, len: usize) -> BufferResult<&[u8]> {
    let end = offset.checked_add(len).ok_or(BufferError::ReadOverflow {
        offset,
        len,
        capacity: buffer.len(),
    })?;
    if end > buffer.len() {
        return Err(BufferError::ReadOverflow {
            offset,
            len,
            capacity: buffer.len(),
        });
    }
    Ok(&buffer[offset..end])
}

/// Copy `data` into the buffer starting at `offset`.
#[inline]
pub fn write_bytes_at(buffer: &mut [u8], offset: usize, data: &[u8]) -> BufferResult<()> {
    let end = offset
        .checked_add(data.len())
        .ok_or(BufferError::WriteOverflow {
            offset,
            len: data.len(),
            capacity: buffer.len(),
        })?;
    if end > buffer.len() {
        return Err(BufferError::WriteOverflow {
            offset,
            len: data.len(),
            capacity: buffer.len(),
        });
    }
    buffer[offset..end].copy_from_slice(data);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_U16: u16 = 0xCDEF;
    const TEST_U32: u32 = 0x1234_5678;
    const TEST_U64: u64 = 0x1122_3344_5566_7788;

    #[test]
    fn test_read_write_roundtrip_at_offsets() {
        let mut buffer = [0u8; 32];
        write_u8_at(&mut buffer, 0, 0xAB).expect("Write u8 should succeed");
        write_u16_at(&mut buffer, 1, TEST_U16).expect("Write u16 should succeed");
        write_u32_at(&mut buffer, 3, TEST_U32).expect("Write u32 should succeed");
        write_u64_at(&mut buffer, 7, TEST_U64).expect("Write u64 should succeed");
        write_i64_at(&mut buffer, 15, -99).expect("Write i64 should succeed");
        write_f64_at(&mut buffer, 23, 6.25).expect("Write f64 should succeed");

        assert_eq!(read_u8_at(&buffer, 0).expect("Read u8 should succeed"), 0xAB);
        assert_eq!(
            read_u16_at(&buffer, 1).expect("Read u16 should succeed"),
            TEST_U16
        );
        assert_eq!(
            read_u32_at(&buffer, 3).expect("Read u32 should succeed"),
            TEST_U32
        );
        assert_eq!(
            read_u64_at(&buffer, 7).expect("Read u64 should succeed"),
            TEST_U64
        );
        assert_eq!(read_i64_at(&buffer, 15).expect("Read i64 should succeed"), -99);
        assert!(
            (read_f64_at(&buffer, 23).expect("Read f64 should succeed") - 6.25).abs()
                < f64::EPSILON
        );
    }

    #[test]
    fn test_wire_bytes_are_little_endian() {
        let mut buffer = [0u8; 8];
        write_u32_at(&mut buffer, 0, 0x0102_0304).expect("Write u32 should succeed");
        assert_eq!(&buffer[..4], &[0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn test_read_overflow_reports_offset() {
        let buffer = [0u8; 4];
        let err = read_u32_at(&buffer, 2).unwrap_err();
        match err {
            BufferError::ReadOverflow {
                offset,
                len,
                capacity,
            } => {
                assert_eq!(offset, 2);
                assert_eq!(len, 4);
                assert_eq!(capacity, 4);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_write_overflow_reports_offset() {
        let mut buffer = [0u8; 4];
        let err = write_u64_at(&mut buffer, 0, 1).unwrap_err();
        assert!(matches!(err, BufferError::WriteOverflow { len: 8, .. }));
    }

    #[test]
    fn test_byte_slice_roundtrip() {
        let mut buffer = [0u8; 8];
        write_bytes_at(&mut buffer, 2, &[0xDE, 0xAD, 0xBE, 0xEF])
            .expect("Write bytes should succeed");
        assert_eq!(
            read_bytes_at(&buffer, 2, 4).expect("Read bytes should succeed"),
            &[0xDE, 0xAD, 0xBE, 0xEF]
        );
        assert!(read_bytes_at(&buffer, 6, 4).is_err());
    }

    #[test]
    fn test_offset_overflow_does_not_wrap() {
        let buffer = [0u8; 4];
        let err = read_u16_at(&buffer, usize::MAX).unwrap_err();
        assert!(matches!(err, BufferError::ReadOverflow { .. }));
    }
}
