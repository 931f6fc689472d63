//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during entry encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The destination buffer lacks space for the serialized entry.
    ///
    /// This is a *recoverable, expected* condition: the segment writer uses
    /// it to detect end-of-segment and roll over. It never indicates
    /// corruption.
    #[error("insufficient capacity: {needed} bytes needed, {remaining} remaining")]
    InsufficientCapacity {
        /// Bytes the write needed.
        needed: usize,
        /// Bytes left in the destination.
        remaining: usize,
    },

    /// Failed to serialize an entry.
    ///
    /// Fatal to the append that triggered it.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to deserialize entry bytes.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }

    /// Returns `true` if this is the recoverable capacity-exhausted signal.
    #[must_use]
    pub const fn is_insufficient_capacity(&self) -> bool {
        matches!(self, Self::InsufficientCapacity { .. })
    }
}
