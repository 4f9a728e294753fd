//! Field codecs for the two GBX encodings.
//!
//! Every typed read in a GBX header goes through a [`FieldCodec`]. Binary
//! files use fixed-width little-endian values; text files store one field
//! per CRLF-terminated line. The codec is chosen once per file from the
//! storage settings and carried by [`GbxReader`], so decoders never branch
//! on the encoding themselves.

use std::fmt;

use crate::text::{scan_hex, scan_real, scan_signed, scan_unsigned};
use crate::{ByteReader, Error, Result, MAX_STRING_LEN};

/// Field encoding of a GBX file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Encoding {
    /// Fixed-width little-endian fields.
    #[default]
    Binary,
    /// CRLF-terminated ASCII fields.
    Text,
}

impl Encoding {
    /// The codec implementing this encoding.
    pub fn codec(self) -> &'static dyn FieldCodec {
        match self {
            Self::Binary => &BinaryCodec,
            Self::Text => &TextCodec,
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => f.write_str("binary"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// Typed field reads over a [`ByteReader`].
pub trait FieldCodec: fmt::Debug + Send + Sync {
    /// The encoding this codec implements.
    fn encoding(&self) -> Encoding;

    fn read_bool(&self, bytes: &mut ByteReader<'_>) -> Result<bool>;
    fn read_mask(&self, bytes: &mut ByteReader<'_>) -> Result<u32>;
    fn read_nat8(&self, bytes: &mut ByteReader<'_>) -> Result<u8>;
    fn read_nat16(&self, bytes: &mut ByteReader<'_>) -> Result<u16>;
    fn read_nat32(&self, bytes: &mut ByteReader<'_>) -> Result<u32>;
    fn read_nat64(&self, bytes: &mut ByteReader<'_>) -> Result<u64>;
    fn read_integer(&self, bytes: &mut ByteReader<'_>) -> Result<i32>;
    fn read_real(&self, bytes: &mut ByteReader<'_>) -> Result<f32>;
    fn read_string(&self, bytes: &mut ByteReader<'_>) -> Result<String>;

    /// Read a 128-bit value as raw bytes.
    ///
    /// Both encodings store these as raw bytes, text files included.
    fn read_nat128(&self, bytes: &mut ByteReader<'_>) -> Result<[u8; 16]> {
        bytes.read_array()
    }

    /// Read a 256-bit value as raw bytes, regardless of encoding.
    fn read_nat256(&self, bytes: &mut ByteReader<'_>) -> Result<[u8; 32]> {
        bytes.read_array()
    }
}

/// Fixed-width little-endian codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl FieldCodec for BinaryCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Binary
    }

    fn read_bool(&self, bytes: &mut ByteReader<'_>) -> Result<bool> {
        bytes.read_u32().map(|v| v != 0)
    }

    fn read_mask(&self, bytes: &mut ByteReader<'_>) -> Result<u32> {
        bytes.read_u32()
    }

    fn read_nat8(&self, bytes: &mut ByteReader<'_>) -> Result<u8> {
        bytes.read_u8()
    }

    fn read_nat16(&self, bytes: &mut ByteReader<'_>) -> Result<u16> {
        bytes.read_u16()
    }

    fn read_nat32(&self, bytes: &mut ByteReader<'_>) -> Result<u32> {
        bytes.read_u32()
    }

    fn read_nat64(&self, bytes: &mut ByteReader<'_>) -> Result<u64> {
        bytes.read_u64()
    }

    fn read_integer(&self, bytes: &mut ByteReader<'_>) -> Result<i32> {
        bytes.read_i32()
    }

    fn read_real(&self, bytes: &mut ByteReader<'_>) -> Result<f32> {
        bytes.read_f32()
    }

    fn read_string(&self, bytes: &mut ByteReader<'_>) -> Result<String> {
        let len = bytes.read_u32()?;
        if len >= MAX_STRING_LEN {
            return Err(Error::limit("string length", len, MAX_STRING_LEN));
        }
        let raw = bytes.read_bytes(len as usize)?;
        Ok(String::from_utf8_lossy(raw).into_owned())
    }
}

/// Line-oriented ASCII codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl FieldCodec for TextCodec {
    fn encoding(&self) -> Encoding {
        Encoding::Text
    }

    fn read_bool(&self, bytes: &mut ByteReader<'_>) -> Result<bool> {
        bytes.read_line().map(|line| line.first() == Some(&b'T'))
    }

    fn read_mask(&self, bytes: &mut ByteReader<'_>) -> Result<u32> {
        scan_hex(bytes.read_line()?)
    }

    // Out-of-range values are rejected, not narrowed.
    fn read_nat8(&self, bytes: &mut ByteReader<'_>) -> Result<u8> {
        scan_unsigned(bytes.read_line()?, "nat8", u8::MAX.into()).map(|v| v as u8)
    }

    fn read_nat16(&self, bytes: &mut ByteReader<'_>) -> Result<u16> {
        scan_unsigned(bytes.read_line()?, "nat16", u16::MAX.into()).map(|v| v as u16)
    }

    fn read_nat32(&self, bytes: &mut ByteReader<'_>) -> Result<u32> {
        scan_unsigned(bytes.read_line()?, "nat32", u32::MAX.into()).map(|v| v as u32)
    }

    fn read_nat64(&self, bytes: &mut ByteReader<'_>) -> Result<u64> {
        scan_unsigned(bytes.read_line()?, "nat64", u64::MAX)
    }

    fn read_integer(&self, bytes: &mut ByteReader<'_>) -> Result<i32> {
        scan_signed(bytes.read_line()?)
    }

    fn read_real(&self, bytes: &mut ByteReader<'_>) -> Result<f32> {
        scan_real(bytes.read_line()?)
    }

    fn read_string(&self, bytes: &mut ByteReader<'_>) -> Result<String> {
        bytes
            .read_line()
            .map(|line| String::from_utf8_lossy(line).into_owned())
    }
}

/// A byte cursor paired with the field codec of the file being decoded.
#[derive(Debug, Clone)]
pub struct GbxReader<'a> {
    bytes: ByteReader<'a>,
    codec: &'static dyn FieldCodec,
}

impl<'a> GbxReader<'a> {
    /// Create a reader over `data` using `encoding`.
    pub fn new(data: &'a [u8], encoding: Encoding) -> Self {
        Self::with_bytes(ByteReader::new(data), encoding)
    }

    /// Wrap an existing byte cursor, keeping its position.
    pub fn with_bytes(bytes: ByteReader<'a>, encoding: Encoding) -> Self {
        Self {
            bytes,
            codec: encoding.codec(),
        }
    }

    /// Switch the codec, keeping the position. Used once the storage
    /// settings of a file are known.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.codec = encoding.codec();
    }

    /// The active encoding.
    pub fn encoding(&self) -> Encoding {
        self.codec.encoding()
    }

    /// The underlying byte cursor.
    pub fn bytes(&self) -> &ByteReader<'a> {
        &self.bytes
    }

    /// Mutable access to the underlying byte cursor.
    pub fn bytes_mut(&mut self) -> &mut ByteReader<'a> {
        &mut self.bytes
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.bytes.position()
    }

    #[inline]
    pub fn seek(&mut self, position: usize) {
        self.bytes.seek(position);
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.remaining()
    }

    /// True once every byte has been consumed.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Read `count` raw bytes.
    pub fn raw(&mut self, count: usize) -> Result<&'a [u8]> {
        self.bytes.read_bytes(count)
    }

    /// Read one CRLF-terminated line.
    pub fn line(&mut self) -> Result<&'a [u8]> {
        self.bytes.read_line()
    }

    pub fn bool(&mut self) -> Result<bool> {
        self.codec.read_bool(&mut self.bytes)
    }

    pub fn mask(&mut self) -> Result<u32> {
        self.codec.read_mask(&mut self.bytes)
    }

    pub fn nat8(&mut self) -> Result<u8> {
        self.codec.read_nat8(&mut self.bytes)
    }

    pub fn nat16(&mut self) -> Result<u16> {
        self.codec.read_nat16(&mut self.bytes)
    }

    pub fn nat32(&mut self) -> Result<u32> {
        self.codec.read_nat32(&mut self.bytes)
    }

    pub fn nat64(&mut self) -> Result<u64> {
        self.codec.read_nat64(&mut self.bytes)
    }

    pub fn nat128(&mut self) -> Result<[u8; 16]> {
        self.codec.read_nat128(&mut self.bytes)
    }

    pub fn nat256(&mut self) -> Result<[u8; 32]> {
        self.codec.read_nat256(&mut self.bytes)
    }

    pub fn integer(&mut self) -> Result<i32> {
        self.codec.read_integer(&mut self.bytes)
    }

    pub fn real(&mut self) -> Result<f32> {
        self.codec.read_real(&mut self.bytes)
    }

    pub fn string(&mut self) -> Result<String> {
        self.codec.read_string(&mut self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn binary_string(s: &str) -> Vec<u8> {
        let mut out = (s.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out
    }

    #[test]
    fn test_binary_scalars() {
        let mut data = Vec::new();
        data.extend_from_slice(&1u32.to_le_bytes());
        data.push(7);
        data.extend_from_slice(&0xBEEFu16.to_le_bytes());
        data.extend_from_slice(&(-5i32).to_le_bytes());
        data.extend_from_slice(&1.5f32.to_le_bytes());
        data.extend_from_slice(&u64::MAX.to_le_bytes());

        let mut r = GbxReader::new(&data, Encoding::Binary);
        assert!(r.bool().unwrap());
        assert_eq!(r.nat8().unwrap(), 7);
        assert_eq!(r.nat16().unwrap(), 0xBEEF);
        assert_eq!(r.integer().unwrap(), -5);
        assert_eq!(r.real().unwrap(), 1.5);
        assert_eq!(r.nat64().unwrap(), u64::MAX);
        assert!(r.is_exhausted());
    }

    #[test]
    fn test_binary_string() {
        let mut data = binary_string("Stadium");
        data.extend_from_slice(&binary_string(""));

        let mut r = GbxReader::new(&data, Encoding::Binary);
        assert_eq!(r.string().unwrap(), "Stadium");
        assert_eq!(r.string().unwrap(), "");
    }

    #[test]
    fn test_binary_string_length_bound() {
        let data = 0xFFFFu32.to_le_bytes();
        let mut r = GbxReader::new(&data, Encoding::Binary);

        let err = r.string().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Malformed);
    }

    #[test]
    fn test_binary_string_truncated() {
        let mut data = 10u32.to_le_bytes().to_vec();
        data.extend_from_slice(b"abc");
        let mut r = GbxReader::new(&data, Encoding::Binary);

        assert_eq!(r.string().unwrap_err().kind(), crate::ErrorKind::Truncated);
    }

    #[test]
    fn test_text_fields() {
        let data = b"True\r\n03043000\r\n255\r\n65535\r\n4000000000\r\n-42\r\n0.5\r\nMy Map\r\nFalse\r\n";
        let mut r = GbxReader::new(data, Encoding::Text);

        assert!(r.bool().unwrap());
        assert_eq!(r.mask().unwrap(), 0x03043000);
        assert_eq!(r.nat8().unwrap(), 255);
        assert_eq!(r.nat16().unwrap(), 65535);
        assert_eq!(r.nat32().unwrap(), 4_000_000_000);
        assert_eq!(r.integer().unwrap(), -42);
        assert_eq!(r.real().unwrap(), 0.5);
        assert_eq!(r.string().unwrap(), "My Map");
        assert!(!r.bool().unwrap());
    }

    #[test]
    fn test_text_nat8_out_of_range() {
        let mut r = GbxReader::new(b"300\r\n", Encoding::Text);
        assert!(matches!(r.nat8(), Err(Error::InvalidText { .. })));
    }

    #[test]
    fn test_wide_values_ignore_encoding() {
        let mut data = vec![0xAAu8; 16];
        data.extend_from_slice(&[0x55u8; 32]);

        let mut r = GbxReader::new(&data, Encoding::Text);
        assert_eq!(r.nat128().unwrap(), [0xAA; 16]);
        assert_eq!(r.nat256().unwrap(), [0x55; 32]);
    }

    #[test]
    fn test_set_encoding_keeps_position() {
        let mut data = 3u32.to_le_bytes().to_vec();
        data.extend_from_slice(b"12\r\n");

        let mut r = GbxReader::new(&data, Encoding::Binary);
        assert_eq!(r.nat32().unwrap(), 3);
        r.set_encoding(Encoding::Text);
        assert_eq!(r.nat32().unwrap(), 12);
        assert_eq!(r.encoding(), Encoding::Text);
    }
}
