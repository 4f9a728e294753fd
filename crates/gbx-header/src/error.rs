//! Error types for GBX header decoding.

use gbx_common::ErrorKind;
use thiserror::Error;

/// Errors that can occur when decoding a GBX file.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Primitive read error.
    #[error("{0}")]
    Common(#[from] gbx_common::Error),

    /// Invalid magic bytes (not a GBX file).
    #[error("invalid GBX magic: expected 'GBX', got {actual:?}")]
    InvalidMagic { actual: Vec<u8> },

    /// Format version outside the supported range.
    #[error("unsupported GBX version: {0} (expected 3 to 6)")]
    UnsupportedVersion(u16),

    /// Storage settings bytes are not one of the known letters.
    #[error("invalid storage settings: {0:?}")]
    InvalidStorageSettings(String),

    /// The header chunk table declares zero chunks.
    #[error("no header chunks")]
    NoChunks,

    /// Identifier context with a version older than 2.
    #[error("unsupported identifier version: {0}")]
    IdentifierVersion(u32),

    /// A literal marker inside a chunk did not match.
    #[error("expected {expected:?}, got {actual:?}")]
    UnexpectedTag {
        expected: &'static str,
        actual: String,
    },

    /// Folder tree nested deeper than the recursion bound.
    #[error("folder tree deeper than {0} levels")]
    FolderTooDeep(usize),

    /// The reference table is compressed and cannot be read.
    #[error("reference table is compressed")]
    CompressedRefTable,

    /// The body of a text-mode file is not described.
    #[error("text-mode body")]
    TextBody,

    /// Body sizes cannot be located because the reference table was not read.
    #[error("body position unknown: reference table not parsed")]
    RefTableUnavailable,
}

impl Error {
    /// Classify this error as truncated, malformed or unsupported.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Common(e) => e.kind(),
            Self::Io(_) => ErrorKind::Truncated,
            Self::InvalidMagic { .. }
            | Self::InvalidStorageSettings(_)
            | Self::NoChunks
            | Self::IdentifierVersion(_)
            | Self::UnexpectedTag { .. }
            | Self::FolderTooDeep(_) => ErrorKind::Malformed,
            Self::UnsupportedVersion(_)
            | Self::CompressedRefTable
            | Self::TextBody
            | Self::RefTableUnavailable => ErrorKind::Unsupported,
        }
    }
}

/// Result type for GBX header operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Serialize errors as their display string.
#[cfg(feature = "serde")]
pub(crate) mod serde_error {
    use serde::ser::{Serialize, Serializer};

    use super::Error;

    pub fn option<S: Serializer>(error: &Option<Error>, s: S) -> Result<S::Ok, S::Error> {
        error.as_ref().map(ToString::to_string).serialize(s)
    }

    #[derive(serde::Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Outcome<'a, T> {
        Ok(&'a T),
        Error(String),
    }

    pub fn outcome<S, T>(outcome: &Result<T, Error>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        match outcome {
            Ok(value) => Outcome::Ok(value).serialize(s),
            Err(e) => Outcome::<'_, T>::Error(e.to_string()).serialize(s),
        }
    }
}
