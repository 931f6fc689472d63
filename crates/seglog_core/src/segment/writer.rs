//! The single mutator of a segment.

use crate::entry::IndexedEntry;
use crate::error::{JournalError, JournalResult};
use crate::frame::{self, FRAME_HEADER_SIZE};
use crate::segment::Segment;
use seglog_codec::{CodecError, EntryBuf, EntryCodec};
use std::sync::Arc;
use tracing::warn;

/// The exclusive writer over one segment.
///
/// Obtained from [`Segment::acquire_writer`]; holds the segment's writer
/// token for its lifetime and releases it on [`close`](Self::close) or drop.
/// Appends entries at strictly consecutive indices, supports in-place
/// truncation, and flushes to durable storage on demand.
pub struct SegmentWriter<T, C> {
    segment: Segment,
    codec: Arc<C>,
    /// Start offset of each entry, in index order.
    offsets: Vec<u64>,
    /// Bytes written to the region so far.
    len: u64,
    last_entry: Option<IndexedEntry<T>>,
    released: bool,
}

impl<T, C> SegmentWriter<T, C> {
    /// Returns the index of the most recently appended entry, or
    /// `base_index - 1` if the segment is empty.
    #[must_use]
    pub fn last_index(&self) -> u64 {
        self.next_index() - 1
    }

    /// Returns the index the next appended entry will receive.
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.segment.base_index() + self.offsets.len() as u64
    }

    /// Returns the entry at [`last_index`](Self::last_index), if any.
    #[must_use]
    pub fn last_entry(&self) -> Option<&IndexedEntry<T>> {
        self.last_entry.as_ref()
    }

    /// Returns the segment this writer mutates.
    #[must_use]
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Forces previously appended bytes to durable storage.
    ///
    /// Orthogonal to commit: flush is "these bytes survive a crash", commit
    /// is "this index is safe to expose".
    ///
    /// # Errors
    ///
    /// Returns an error if the storage flush fails.
    pub fn flush(&mut self) -> JournalResult<()> {
        self.segment.flush_storage()
    }

    /// Releases the writer token without consuming the writer.
    ///
    /// Idempotent; dropping the writer has the same effect.
    pub(crate) fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.segment.release_writer();
        }
    }

    /// Releases the writer. Does not flush; callers needing durability must
    /// flush first.
    pub fn close(mut self) {
        self.release();
    }
}

impl<T, C> SegmentWriter<T, C>
where
    T: Clone,
    C: EntryCodec<T>,
{
    pub(crate) fn new(segment: Segment, codec: Arc<C>) -> JournalResult<Self> {
        let mut writer = Self {
            segment,
            codec,
            offsets: Vec::new(),
            len: 0,
            last_entry: None,
            released: false,
        };
        writer.rescan()?;
        Ok(writer)
    }

    /// Walks the region's frames to re-establish the writer position.
    ///
    /// A torn frame at the end of the region (crash mid-write before flush)
    /// is discarded; a checksum mismatch in a complete frame is corruption
    /// and aborts the acquire.
    fn rescan(&mut self) -> JournalResult<()> {
        let mut offset = 0u64;
        let mut last_payload = None;

        while let Some((payload, next)) = self.segment.read_frame(offset)? {
            self.offsets.push(offset);
            offset = next;
            last_payload = Some(payload);
        }

        let region_len = self.segment.storage_len()?;
        if region_len > offset {
            warn!(
                base_index = self.segment.base_index(),
                discarded = region_len - offset,
                "discarding torn frame at end of segment"
            );
            self.segment.truncate_storage(offset)?;
        }
        self.len = offset;

        if let Some(payload) = last_payload {
            let index = self.last_index();
            let entry = self
                .codec
                .decode(index, &payload)
                .map_err(JournalError::Codec)?;
            self.last_entry = Some(IndexedEntry::new(index, entry, payload.len() as u32));
        }

        Ok(())
    }

    /// Appends `value` at [`next_index`](Self::next_index).
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::SegmentFull`] when the segment lacks space
    /// for the serialized entry - the owner interprets this as "roll over",
    /// not as a fatal failure. Any other codec or storage error is fatal to
    /// the append.
    pub fn append(&mut self, value: &T) -> JournalResult<IndexedEntry<T>> {
        let index = self.next_index();
        let payload = self.encode_bounded(value, index)?;
        self.write_frame(&payload)?;

        let indexed = IndexedEntry::new(index, value.clone(), payload.len() as u32);
        self.last_entry = Some(indexed.clone());
        Ok(indexed)
    }

    /// Re-appends an already-indexed entry, e.g. when forwarding entries
    /// across segments during replication.
    ///
    /// # Panics
    ///
    /// Panics if `entry.index()` is not [`next_index`](Self::next_index) -
    /// a contract violation, not a recoverable condition.
    ///
    /// # Errors
    ///
    /// Same capacity semantics as [`append`](Self::append).
    pub fn append_indexed(&mut self, entry: &IndexedEntry<T>) -> JournalResult<()> {
        assert_eq!(
            entry.index(),
            self.next_index(),
            "indexed entry {} cannot be appended at index {}",
            entry.index(),
            self.next_index()
        );

        let payload = self.encode_bounded(entry.entry(), entry.index())?;
        self.write_frame(&payload)?;

        self.last_entry = Some(entry.clone());
        Ok(())
    }

    /// Discards all entries with index strictly greater than `index`.
    ///
    /// Rewinds the region to the end of entry `index`, or to the segment's
    /// empty state if `index < base_index`. Truncating at or beyond the
    /// current last index is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if rewinding the storage or re-reading the new last
    /// entry fails.
    pub fn truncate(&mut self, index: u64) -> JournalResult<()> {
        if index >= self.last_index() {
            return Ok(());
        }

        let base = self.segment.base_index();
        if index < base {
            self.segment.truncate_storage(0)?;
            self.offsets.clear();
            self.len = 0;
            self.last_entry = None;
            return Ok(());
        }

        let keep = (index - base + 1) as usize;
        let new_len = self.offsets[keep];
        self.segment.truncate_storage(new_len)?;
        self.offsets.truncate(keep);
        self.len = new_len;

        // Restore the last-entry cache from storage.
        let last_offset = self.offsets[keep - 1];
        let (payload, _) = self
            .segment
            .read_frame(last_offset)?
            .ok_or_else(|| JournalError::corruption(last_offset, "missing frame after truncate"))?;
        let entry = self
            .codec
            .decode(index, &payload)
            .map_err(JournalError::Codec)?;
        self.last_entry = Some(IndexedEntry::new(index, entry, payload.len() as u32));

        Ok(())
    }

    /// Encodes `value` into the segment's remaining payload space, mapping
    /// capacity exhaustion to [`JournalError::SegmentFull`].
    fn encode_bounded(&self, value: &T, index: u64) -> JournalResult<Vec<u8>> {
        let remaining =
            (self.segment.capacity() - self.len).saturating_sub(FRAME_HEADER_SIZE as u64);

        let mut buf = EntryBuf::with_limit(remaining as usize);
        match self.codec.encode(value, &mut buf) {
            Ok(()) => Ok(buf.as_slice().to_vec()),
            Err(CodecError::InsufficientCapacity { needed, remaining }) => {
                Err(JournalError::SegmentFull {
                    index,
                    needed,
                    remaining,
                })
            }
            Err(other) => Err(JournalError::Codec(other)),
        }
    }

    fn write_frame(&mut self, payload: &[u8]) -> JournalResult<()> {
        let frame = frame::encode_frame(payload);
        self.segment.append_frame(&frame)?;
        self.offsets.push(self.len);
        self.len += frame.len() as u64;
        Ok(())
    }
}

impl<T, C> Drop for SegmentWriter<T, C> {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            self.segment.release_writer();
        }
    }
}

impl<T: std::fmt::Debug, C> std::fmt::Debug for SegmentWriter<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentWriter")
            .field("base_index", &self.segment.base_index())
            .field("last_index", &self.last_index())
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}
