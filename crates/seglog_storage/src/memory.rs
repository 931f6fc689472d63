//! In-memory storage region for testing and ephemeral journals.

use crate::error::{StorageError, StorageResult};
use crate::region::SegmentStorage;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct MemoryInner {
    data: RwLock<Vec<u8>>,
    capacity: u64,
    flushes: AtomicU64,
}

/// An in-memory storage region.
///
/// This region stores all data in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral journals that don't need persistence
///
/// # Sharing
///
/// `MemoryStorage` is a cheap cloneable handle over shared state: clones see
/// the same bytes. [`super::MemoryProvider`] keeps a handle to every region
/// it allocates so tests can observe segment contents and flush counts while
/// the journal owns the region.
///
/// # Example
///
/// ```rust
/// use seglog_storage::{MemoryStorage, SegmentStorage};
///
/// let mut region = MemoryStorage::with_capacity(128);
/// let offset = region.append(b"test data").unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(region.len().unwrap(), 9);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    inner: Arc<MemoryInner>,
}

impl MemoryStorage {
    /// Creates a new empty in-memory region with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                data: RwLock::new(Vec::new()),
                capacity,
                flushes: AtomicU64::new(0),
            }),
        }
    }

    /// Returns a copy of all data in the region.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.inner.data.read().clone()
    }

    /// Returns how many times [`SegmentStorage::flush`] has been called.
    ///
    /// Lets tests observe the flush-on-commit policy.
    #[must_use]
    pub fn flush_count(&self) -> u64 {
        self.inner.flushes.load(Ordering::Acquire)
    }
}

impl SegmentStorage for MemoryStorage {
    fn capacity(&self) -> u64 {
        self.inner.capacity
    }

    fn len(&self) -> StorageResult<u64> {
        Ok(self.inner.data.read().len() as u64)
    }

    fn append(&mut self, new_data: &[u8]) -> StorageResult<u64> {
        let mut data = self.inner.data.write();
        let offset = data.len() as u64;
        let remaining = self.inner.capacity - offset;

        if new_data.len() as u64 > remaining {
            return Err(StorageError::RegionFull {
                requested: new_data.len(),
                remaining,
                capacity: self.inner.capacity,
            });
        }

        data.extend_from_slice(new_data);
        Ok(offset)
    }

    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.inner.data.read();
        let size = data.len() as u64;
        let offset_usize = offset as usize;
        let end = offset_usize.saturating_add(len);

        if offset > size || end > data.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[offset_usize..end].to_vec())
    }

    fn truncate(&mut self, new_len: u64) -> StorageResult<()> {
        let mut data = self.inner.data.write();
        let len = data.len() as u64;

        if new_len > len {
            return Err(StorageError::TruncatePastEnd { new_len, len });
        }

        data.truncate(new_len as usize);
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        // No pending writes; count the call so tests can observe it.
        self.inner.flushes.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let region = MemoryStorage::with_capacity(16);
        assert_eq!(region.len().unwrap(), 0);
        assert!(region.is_empty().unwrap());
        assert_eq!(region.capacity(), 16);
    }

    #[test]
    fn memory_append_returns_correct_offset() {
        let mut region = MemoryStorage::with_capacity(64);

        let offset1 = region.append(b"hello").unwrap();
        assert_eq!(offset1, 0);

        let offset2 = region.append(b" world").unwrap();
        assert_eq!(offset2, 5);

        assert_eq!(region.len().unwrap(), 11);
    }

    #[test]
    fn memory_append_past_capacity_fails() {
        let mut region = MemoryStorage::with_capacity(8);
        region.append(b"12345").unwrap();

        let result = region.append(b"6789");
        assert!(matches!(
            result,
            Err(StorageError::RegionFull {
                requested: 4,
                remaining: 3,
                capacity: 8,
            })
        ));

        // A failed append leaves the region unchanged.
        assert_eq!(region.len().unwrap(), 5);
    }

    #[test]
    fn memory_append_exactly_to_capacity() {
        let mut region = MemoryStorage::with_capacity(5);
        region.append(b"12345").unwrap();
        assert_eq!(region.len().unwrap(), 5);
        assert!(region.append(b"x").is_err());
    }

    #[test]
    fn memory_read_at_returns_correct_data() {
        let mut region = MemoryStorage::with_capacity(64);
        region.append(b"hello world").unwrap();

        let data = region.read_at(0, 5).unwrap();
        assert_eq!(&data, b"hello");

        let data = region.read_at(6, 5).unwrap();
        assert_eq!(&data, b"world");
    }

    #[test]
    fn memory_read_past_end_fails() {
        let mut region = MemoryStorage::with_capacity(64);
        region.append(b"hello").unwrap();

        let result = region.read_at(10, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));

        let result = region.read_at(3, 10);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn memory_truncate_partial() {
        let mut region = MemoryStorage::with_capacity(64);
        region.append(b"hello world").unwrap();

        region.truncate(5).unwrap();
        assert_eq!(region.len().unwrap(), 5);
        assert_eq!(region.read_at(0, 5).unwrap(), b"hello");
    }

    #[test]
    fn memory_truncate_to_zero() {
        let mut region = MemoryStorage::with_capacity(64);
        region.append(b"hello world").unwrap();

        region.truncate(0).unwrap();
        assert_eq!(region.len().unwrap(), 0);
    }

    #[test]
    fn memory_truncate_past_end_fails() {
        let mut region = MemoryStorage::with_capacity(64);
        region.append(b"hello").unwrap();

        let result = region.truncate(100);
        assert!(matches!(result, Err(StorageError::TruncatePastEnd { .. })));
    }

    #[test]
    fn memory_truncate_then_append_reuses_space() {
        let mut region = MemoryStorage::with_capacity(10);
        region.append(b"aaaaaaaa").unwrap();
        region.truncate(2).unwrap();

        let offset = region.append(b"bbbbbb").unwrap();
        assert_eq!(offset, 2);
        assert_eq!(region.data(), b"aabbbbbb");
    }

    #[test]
    fn memory_flush_is_counted() {
        let mut region = MemoryStorage::with_capacity(16);
        assert_eq!(region.flush_count(), 0);

        region.flush().unwrap();
        region.flush().unwrap();
        assert_eq!(region.flush_count(), 2);
    }

    #[test]
    fn memory_clones_share_data() {
        let mut region = MemoryStorage::with_capacity(16);
        let observer = region.clone();

        region.append(b"shared").unwrap();
        assert_eq!(observer.data(), b"shared");
    }
}
