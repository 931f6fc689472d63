//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to read beyond the end of the region.
    #[error("read beyond end of region: offset {offset}, len {len}, size {size}")]
    ReadPastEnd {
        /// The requested read offset.
        offset: u64,
        /// The requested read length.
        len: usize,
        /// The current region size.
        size: u64,
    },

    /// Attempted to append beyond the region's fixed capacity.
    #[error("region full: {requested} bytes requested, {remaining} of {capacity} remaining")]
    RegionFull {
        /// Bytes the append asked for.
        requested: usize,
        /// Bytes left before the capacity limit.
        remaining: u64,
        /// The region's fixed capacity.
        capacity: u64,
    },

    /// Attempted to truncate to a length greater than the current size.
    #[error("cannot truncate to {new_len}: region holds only {len} bytes")]
    TruncatePastEnd {
        /// The requested new length.
        new_len: u64,
        /// The current region length.
        len: u64,
    },

    /// A segment file name did not match the expected layout.
    #[error("invalid segment file name: {name}")]
    InvalidSegmentName {
        /// The offending file name.
        name: String,
    },
}
