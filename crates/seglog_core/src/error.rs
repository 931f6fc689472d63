//! Error types for the journal core.

use seglog_codec::CodecError;
use thiserror::Error;

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;

/// Errors that can occur in journal operations.
///
/// [`JournalError::SegmentFull`] is the one *expected* variant: it drives
/// segment rollover and becomes fatal only when even an empty segment cannot
/// hold the entry. Everything else is fatal to the operation that raised it
/// and is propagated unchanged - the journal never retries internally.
///
/// Contract violations (truncating below the commit index, re-appending an
/// indexed entry at the wrong index, double writer acquisition) are not
/// errors: they panic.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Storage region error.
    #[error("storage error: {0}")]
    Storage(#[from] seglog_storage::StorageError),

    /// Entry codec error other than capacity exhaustion.
    #[error("codec error: {0}")]
    Codec(CodecError),

    /// The segment lacks space for the entry being appended.
    ///
    /// Recoverable: the journal writer rolls over to a fresh segment and
    /// retries exactly once.
    #[error("segment full: entry {index} needs {needed} bytes, {remaining} remaining")]
    SegmentFull {
        /// Index the entry would have been written at.
        index: u64,
        /// Payload bytes the entry needed.
        needed: usize,
        /// Payload bytes the segment had left.
        remaining: usize,
    },

    /// A stored entry frame failed validation.
    #[error("corrupt entry frame at offset {offset}: {message}")]
    Corruption {
        /// Byte offset of the frame within its segment.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// Operation not permitted in the current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl JournalError {
    /// Creates a corruption error.
    pub fn corruption(offset: u64, message: impl Into<String>) -> Self {
        Self::Corruption {
            offset,
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns `true` if this is the recoverable segment-full signal.
    #[must_use]
    pub const fn is_segment_full(&self) -> bool {
        matches!(self, Self::SegmentFull { .. })
    }
}
