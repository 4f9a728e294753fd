//! Error types for gbx-common.

use thiserror::Error;

/// Coarse classification shared by every GBX error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ErrorKind {
    /// Fewer bytes were available than a read required.
    Truncated,
    /// A value failed a sanity bound or could not be parsed.
    Malformed,
    /// The input uses a feature this decoder does not handle.
    Unsupported,
}

/// Primitive read errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    Truncated { needed: usize, available: usize },

    /// A carriage return was not followed by a line feed.
    #[error("carriage return at offset {offset} is not followed by a line feed")]
    BadLineTerminator { offset: usize },

    /// No line terminator within the line length bound.
    #[error("line at offset {offset} is longer than {limit} bytes")]
    LineTooLong { offset: usize, limit: usize },

    /// A text-mode field could not be parsed.
    #[error("cannot parse {expected} from text {text:?}")]
    InvalidText { expected: &'static str, text: String },

    /// A count or length failed its sanity bound.
    #[error("{what} {value} exceeds the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        value: u64,
        limit: u64,
    },
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Truncated { .. } => ErrorKind::Truncated,
            Self::BadLineTerminator { .. }
            | Self::LineTooLong { .. }
            | Self::InvalidText { .. }
            | Self::LimitExceeded { .. } => ErrorKind::Malformed,
        }
    }

    /// Build a [`Error::LimitExceeded`] for `value` against an inclusive-exclusive `limit`.
    pub fn limit(what: &'static str, value: impl Into<u64>, limit: impl Into<u64>) -> Self {
        Self::LimitExceeded {
            what,
            value: value.into(),
            limit: limit.into(),
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
