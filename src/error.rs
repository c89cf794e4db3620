use std::borrow::Cow;
use std::fmt;
use std::io;

use crate::metadata::DataType;

/// Result type used across the client codec and result assembly layers.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type surfaced by the value codecs, request normalizer and result readers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure while writing results to an external sink or log file.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A bitmask was accessed outside of `[0, capacity)`.
    #[error("bitmask index {index} out of range for capacity {capacity}")]
    Range { index: usize, capacity: usize },

    /// A present value does not match the type declared for its slot.
    #[error("type mismatch at {section}: declared {expected} but value is {found}")]
    TypeMismatch {
        section: Section,
        expected: DataType,
        found: DataType,
    },

    /// A wire type tag outside of the closed set of supported types.
    #[error("unsupported data type tag {tag}")]
    UnsupportedType { tag: i32 },

    /// Request arguments are empty or their parallel arrays disagree in length.
    #[error("invalid request: {details}")]
    Validation { details: Cow<'static, str> },

    /// Opaque failure reported by the RPC or paging collaborator.
    #[error("transport error: {details}")]
    Transport { details: Cow<'static, str> },

    /// A response buffer does not hold what its declared layout promises.
    #[error("corrupted payload while decoding {section}: {details}")]
    Corrupted {
        section: Section,
        details: Cow<'static, str>,
    },

    /// Failure reported by a row sink while exporting results.
    #[error("sink error: {details}")]
    Sink { details: Cow<'static, str> },
}

impl Error {
    /// Builds a [`Error::Validation`] from any message.
    pub fn validation(details: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation {
            details: details.into(),
        }
    }

    /// Wraps a collaborator failure without interpreting it.
    pub fn transport(details: impl fmt::Display) -> Self {
        Self::Transport {
            details: Cow::Owned(details.to_string()),
        }
    }

    /// Re-labels positional errors with the batch location they occurred at.
    #[must_use]
    pub fn in_section(self, at: Section) -> Self {
        match self {
            Self::TypeMismatch {
                expected, found, ..
            } => Self::TypeMismatch {
                section: at,
                expected,
                found,
            },
            Self::Corrupted { details, .. } => Self::Corrupted {
                section: at,
                details,
            },
            other => other,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Sink {
            details: Cow::Owned(err.to_string()),
        }
    }
}

/// Location inside an encoded batch, used for diagnostic reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// A single scalar with no batch context.
    Value,
    /// Cell at `row` (timestamp index) and `column` (path index).
    Cell { row: usize, column: usize },
    /// The timestamp buffer.
    Timestamps,
    /// A presence bitmask buffer.
    Bitmap,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value => write!(f, "value"),
            Self::Cell { row, column } => write!(f, "row {row} column {column}"),
            Self::Timestamps => write!(f, "timestamps"),
            Self::Bitmap => write!(f, "bitmap"),
        }
    }
}
