//! Journal segments.
//!
//! A segment is a capacity-bounded, contiguous sub-range of the journal's
//! index space backed by one storage region. The segment based at index `b`
//! holds entries `b, b+1, ...` until its region runs out of space; the next
//! segment picks up at the following index.
//!
//! A segment hands out exactly one writer at a time and any number of
//! independent frame readers. Writer acquisition is a single-holder token:
//! acquiring while a writer is already checked out is a programming error
//! and panics.

mod writer;

pub use writer::SegmentWriter;

use crate::error::{JournalError, JournalResult};
use crate::frame::{self, FRAME_HEADER_SIZE};
use parking_lot::Mutex;
use seglog_codec::EntryCodec;
use seglog_storage::SegmentStorage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct SegmentInner {
    base_index: u64,
    capacity: u64,
    storage: Mutex<Box<dyn SegmentStorage>>,
    writer_out: AtomicBool,
}

/// A handle to one journal segment.
///
/// Cheap to clone; the journal's segment map, the writer facade, and readers
/// all hold clones of the same underlying segment.
#[derive(Clone)]
pub struct Segment {
    inner: Arc<SegmentInner>,
}

impl Segment {
    pub(crate) fn new(base_index: u64, storage: Box<dyn SegmentStorage>) -> Self {
        debug_assert!(base_index >= 1, "segment base index must be at least 1");
        let capacity = storage.capacity();
        Self {
            inner: Arc::new(SegmentInner {
                base_index,
                capacity,
                storage: Mutex::new(storage),
                writer_out: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the index of the first entry this segment can ever contain.
    #[must_use]
    pub fn base_index(&self) -> u64 {
        self.inner.base_index
    }

    /// Returns the fixed byte capacity of the segment's storage region.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.inner.capacity
    }

    /// Acquires the segment's exclusive writer.
    ///
    /// Rescans any frames already present in the region to re-establish the
    /// writer's position; a torn frame at the end of the region (a crash
    /// mid-write) is discarded.
    ///
    /// # Panics
    ///
    /// Panics if a writer is already checked out for this segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the rescan hits a storage failure, a checksum
    /// mismatch, or an undecodable final entry.
    pub fn acquire_writer<T, C>(&self, codec: Arc<C>) -> JournalResult<SegmentWriter<T, C>>
    where
        T: Clone,
        C: EntryCodec<T>,
    {
        let already_out = self.inner.writer_out.swap(true, Ordering::AcqRel);
        assert!(
            !already_out,
            "segment {} already has a writer checked out",
            self.base_index()
        );
        // Construction rescans; on failure the writer is dropped and the
        // token released.
        SegmentWriter::new(self.clone(), codec)
    }

    pub(crate) fn release_writer(&self) {
        self.inner.writer_out.store(false, Ordering::Release);
    }

    /// Reads the frame starting at `offset`.
    ///
    /// Returns the payload and the offset of the following frame, or `None`
    /// when `offset` is at (or a torn frame trails past) the end of the
    /// written region.
    pub(crate) fn read_frame(&self, offset: u64) -> JournalResult<Option<(Vec<u8>, u64)>> {
        let storage = self.inner.storage.lock();
        let len = storage.len()?;

        if offset + FRAME_HEADER_SIZE as u64 > len {
            return Ok(None);
        }

        let header = storage.read_at(offset, FRAME_HEADER_SIZE)?;
        let (payload_len, crc) = frame::decode_header(&header);

        let payload_offset = offset + FRAME_HEADER_SIZE as u64;
        if payload_offset + u64::from(payload_len) > len {
            return Ok(None);
        }

        let payload = storage.read_at(payload_offset, payload_len as usize)?;
        if !frame::verify(&payload, crc) {
            return Err(JournalError::corruption(offset, "checksum mismatch"));
        }

        Ok(Some((payload, payload_offset + u64::from(payload_len))))
    }

    pub(crate) fn append_frame(&self, bytes: &[u8]) -> JournalResult<u64> {
        Ok(self.inner.storage.lock().append(bytes)?)
    }

    pub(crate) fn truncate_storage(&self, new_len: u64) -> JournalResult<()> {
        Ok(self.inner.storage.lock().truncate(new_len)?)
    }

    pub(crate) fn flush_storage(&self) -> JournalResult<()> {
        Ok(self.inner.storage.lock().flush()?)
    }

    pub(crate) fn storage_len(&self) -> JournalResult<u64> {
        self.inner.storage.lock().len().map_err(JournalError::from)
    }
}

impl std::fmt::Debug for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("base_index", &self.base_index())
            .field("capacity", &self.capacity())
            .finish_non_exhaustive()
    }
}
