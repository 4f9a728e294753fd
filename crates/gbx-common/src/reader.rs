//! Byte cursor for zero-copy reading of GBX buffers.
//!
//! This module provides [`ByteReader`], a cursor-like type that reads raw
//! bytes, little-endian scalars and CRLF-terminated lines from a byte slice
//! without copying. Seeks are absolute, so decoders can jump between the
//! fixed header area and computed chunk offsets.

use byteorder::{ByteOrder, LittleEndian};

use crate::{Error, Result};

/// Longest line accepted by [`ByteReader::read_line`], terminator excluded.
pub const MAX_LINE_LEN: usize = 4096;

/// A binary reader that provides zero-copy reading from a byte slice.
///
/// # Example
///
/// ```
/// use gbx_common::ByteReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, b'o', b'k', b'\r', b'\n'];
/// let mut reader = ByteReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_line().unwrap(), b"ok");
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    ///
    /// Seeking past the end is allowed; the next read reports [`Error::Truncated`].
    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    /// Advance the position by a number of bytes.
    #[inline]
    pub fn advance(&mut self, count: usize) {
        self.position = self.position.saturating_add(count);
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Borrow `len` bytes starting at the absolute offset `start`.
    pub fn slice(&self, start: usize, len: usize) -> Result<&'a [u8]> {
        start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or(Error::Truncated {
                needed: len,
                available: self.data.len().saturating_sub(start),
            })
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        self.slice(self.position, count)
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size array of bytes.
    #[inline]
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read_bytes(2).map(LittleEndian::read_u16)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read_bytes(4).map(LittleEndian::read_i32)
    }

    /// Read a little-endian u64.
    #[inline]
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read_bytes(8).map(LittleEndian::read_u64)
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read_bytes(4).map(LittleEndian::read_f32)
    }

    /// Peek at a u32 without advancing.
    #[inline]
    pub fn peek_u32(&self) -> Result<u32> {
        self.peek_bytes(4).map(LittleEndian::read_u32)
    }

    /// Read a CRLF-terminated line, returning it without the terminator.
    ///
    /// At most [`MAX_LINE_LEN`] bytes are scanned for the carriage return.
    pub fn read_line(&mut self) -> Result<&'a [u8]> {
        let start = self.position;
        let rest = self.remaining_bytes();
        let window = &rest[..rest.len().min(MAX_LINE_LEN)];

        let Some(cr) = memchr::memchr(b'\r', window) else {
            if rest.len() >= MAX_LINE_LEN {
                return Err(Error::LineTooLong {
                    offset: start,
                    limit: MAX_LINE_LEN,
                });
            }
            return Err(Error::Truncated {
                needed: rest.len() + 2,
                available: rest.len(),
            });
        };

        match rest.get(cr + 1) {
            Some(b'\n') => {
                self.position += cr + 2;
                Ok(&rest[..cr])
            }
            Some(_) => Err(Error::BadLineTerminator { offset: start + cr }),
            None => Err(Error::Truncated {
                needed: cr + 2,
                available: rest.len(),
            }),
        }
    }

    /// Expect specific literal bytes at the current position.
    ///
    /// Returns the bytes actually read so callers can report mismatches.
    pub fn read_literal(&mut self, expected: &[u8]) -> Result<(bool, &'a [u8])> {
        let actual = self.read_bytes(expected.len())?;
        Ok((actual == expected, actual))
    }
}
