//! Storage region trait definition.

use crate::error::StorageResult;

/// A bounded writable byte region backing one journal segment.
///
/// Regions are **opaque byte stores** with a fixed capacity. They provide
/// simple operations for appending, reading, truncating, and flushing data.
/// The journal core owns all format interpretation - regions do not
/// understand entry frames, indices, or commit state.
///
/// # Invariants
///
/// - `append` returns the offset where data was written
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `append` never grows the region past `capacity`
/// - `flush` ensures all appended data is durable
/// - Regions must be `Send + Sync` so readers can run concurrently with
///   the writer
///
/// # Implementors
///
/// - [`super::MemoryStorage`] - for testing and ephemeral journals
/// - [`super::FileStorage`] - for persistent storage
pub trait SegmentStorage: Send + Sync {
    /// Returns the fixed byte capacity of this region.
    fn capacity(&self) -> u64;

    /// Returns the number of bytes written so far.
    ///
    /// This is the offset where the next `append` will write.
    ///
    /// # Errors
    ///
    /// Returns an error if the length cannot be determined.
    fn len(&self) -> StorageResult<u64>;

    /// Returns `true` if nothing has been written to the region.
    ///
    /// # Errors
    ///
    /// Returns an error if the length cannot be determined.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Appends data at the current end of the region.
    ///
    /// Returns the offset where the data was written.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StorageError::RegionFull`] if the write would exceed
    /// the region's capacity, or an I/O error if the write fails.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The offset is beyond the current length
    /// - The read would extend beyond the current length
    /// - An I/O error occurs
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Truncates the region to the given length.
    ///
    /// This removes all data after the specified offset. The journal uses it
    /// to discard uncommitted suffixes in place.
    ///
    /// # Errors
    ///
    /// Returns an error if `new_len` is greater than the current length or
    /// the truncation fails.
    fn truncate(&mut self, new_len: u64) -> StorageResult<()>;

    /// Flushes all pending writes to durable storage.
    ///
    /// After this returns successfully, all previously appended data is
    /// guaranteed to survive process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush operation fails.
    fn flush(&mut self) -> StorageResult<()>;
}
