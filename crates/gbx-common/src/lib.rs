//! Common utilities for GBX decoding.
//!
//! This crate provides the primitive layer every other GBX crate builds on:
//!
//! - [`ByteReader`] - Zero-copy cursor over a byte slice with absolute seeks
//!   and CRLF line reading
//! - [`Encoding`] - The two field encodings a GBX file can use
//! - [`FieldCodec`] - Typed field reads, implemented by [`BinaryCodec`] and
//!   [`TextCodec`]
//! - [`GbxReader`] - A byte cursor paired with the codec selected for a file
//! - [`text`] - scanf-style parsing used by the text codec

mod codec;
mod error;
mod reader;

pub mod text;

pub use codec::{BinaryCodec, Encoding, FieldCodec, GbxReader, TextCodec};
pub use error::{Error, ErrorKind, Result};
pub use reader::{ByteReader, MAX_LINE_LEN};

/// Length bound for binary strings. Lengths at or above this are rejected.
pub const MAX_STRING_LEN: u32 = 0xFFFF;
