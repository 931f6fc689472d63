//! The journal's single append/commit/truncate/flush entry point.

use crate::entry::IndexedEntry;
use crate::error::JournalResult;
use crate::journal::Journal;
use crate::segment::{Segment, SegmentWriter};
use seglog_codec::EntryCodec;
use std::sync::Arc;
use tracing::debug;

/// The single logical writer over a [`Journal`].
///
/// Owns the "current segment + current writer" cursor for the life of the
/// journal and drives segment rollover: an append that does not fit the
/// current segment is retried exactly once on a fresh segment. One logical
/// thread of control issues calls in strict sequence; the `&mut self`
/// receivers make concurrent use impossible by construction.
pub struct JournalWriter<T, C: EntryCodec<T>> {
    journal: Arc<Journal<T, C>>,
    segment: Segment,
    writer: SegmentWriter<T, C>,
}

impl<T, C: EntryCodec<T>> JournalWriter<T, C> {
    /// Returns the index of the most recently appended entry.
    #[must_use]
    pub fn last_index(&self) -> u64 {
        self.writer.last_index()
    }

    /// Returns the most recently appended entry, if any.
    #[must_use]
    pub fn last_entry(&self) -> Option<&IndexedEntry<T>> {
        self.writer.last_entry()
    }

    /// Returns the index the next appended entry will receive.
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.writer.next_index()
    }
}

impl<T, C> JournalWriter<T, C>
where
    T: Clone,
    C: EntryCodec<T>,
{
    /// Creates the facade positioned at the journal's last segment.
    ///
    /// Create it once per journal: it owns the single write cursor for the
    /// journal's lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the last segment cannot be scanned.
    pub fn new(journal: Arc<Journal<T, C>>) -> JournalResult<Self> {
        let segment = journal.last_segment();
        let writer = segment.acquire_writer(journal.codec())?;
        Ok(Self {
            journal,
            segment,
            writer,
        })
    }

    /// Appends an entry at [`next_index`](Self::next_index).
    ///
    /// If the current segment is full, rolls over to a fresh segment and
    /// retries exactly once. The failure is fatal only when even an empty
    /// segment cannot hold the entry, detected by comparing the segment's
    /// base index with the writer's next index - an empty segment's base
    /// *is* its next index, so equality means nothing else could have
    /// consumed the space.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError::SegmentFull`](crate::JournalError::SegmentFull)
    /// for an entry larger than an empty segment, or any fatal codec/storage
    /// error.
    pub fn append(&mut self, entry: &T) -> JournalResult<IndexedEntry<T>> {
        match self.writer.append(entry) {
            Ok(indexed) => return Ok(indexed),
            Err(err) if err.is_segment_full() => {
                if self.segment.base_index() == self.writer.next_index() {
                    return Err(err);
                }
            }
            Err(err) => return Err(err),
        }

        self.move_to_next_segment()?;
        self.writer.append(entry)
    }

    /// Re-appends an already-indexed entry, with the same rollover
    /// semantics as [`append`](Self::append).
    ///
    /// # Panics
    ///
    /// Panics if `entry.index()` is not [`next_index`](Self::next_index).
    ///
    /// # Errors
    ///
    /// Same as [`append`](Self::append).
    pub fn append_indexed(&mut self, entry: &IndexedEntry<T>) -> JournalResult<()> {
        match self.writer.append_indexed(entry) {
            Ok(()) => return Ok(()),
            Err(err) if err.is_segment_full() => {
                if self.segment.base_index() == self.writer.next_index() {
                    return Err(err);
                }
            }
            Err(err) => return Err(err),
        }

        self.move_to_next_segment()?;
        self.writer.append_indexed(entry)
    }

    /// Commits entries up to `index`.
    ///
    /// Only advances the stored commit index - commits never retreat. When
    /// the index advances and the journal's flush-on-commit policy is set,
    /// flushes before returning so durability precedes acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns an error if the coupled flush fails.
    pub fn commit(&mut self, index: u64) -> JournalResult<()> {
        if index > self.journal.commit_index() {
            self.journal.set_commit_index(index);
            debug!(index, "advanced commit index");
            if self.journal.flush_on_commit() {
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Resets the head of the journal to `index`, e.g. after installing a
    /// snapshot.
    ///
    /// Resetting forward past the current segment's base rebuilds the
    /// journal from scratch at `index`; otherwise this is a truncation to
    /// `index - 1`. Either way readers are signalled the new first valid
    /// index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is zero, or if the fallback truncation would cut
    /// below the commit index.
    ///
    /// # Errors
    ///
    /// Returns an error if segment storage cannot be rebuilt or truncated.
    pub fn reset(&mut self, index: u64) -> JournalResult<()> {
        assert!(index >= 1, "cannot reset to index 0");

        if index > self.segment.base_index() {
            self.writer.release();
            self.segment = self.journal.reset_segments(index)?;
            self.writer = self.segment.acquire_writer(self.journal.codec())?;
            debug!(index, "reset journal writer");
        } else {
            self.truncate(index - 1)?;
        }

        self.journal.reset_head(index);
        Ok(())
    }

    /// Discards all entries with index strictly greater than `index`.
    ///
    /// Whole segments lying entirely above `index` are deleted outright;
    /// the remainder is truncated in place within the segment that keeps
    /// `index`. Readers are signalled that indices past `index` are gone.
    ///
    /// # Panics
    ///
    /// Panics if `index` is below the commit index: committed history is
    /// immutable.
    ///
    /// # Errors
    ///
    /// Returns an error if segment storage cannot be removed or truncated.
    pub fn truncate(&mut self, index: u64) -> JournalResult<()> {
        assert!(
            index >= self.journal.commit_index(),
            "cannot truncate committed index {index} (commit index {})",
            self.journal.commit_index()
        );

        // Delete whole segments whose entire index range lies above the
        // target, walking the cursor back to the journal's new last segment.
        while index < self.segment.base_index()
            && self.segment.base_index() != self.journal.first_segment().base_index()
        {
            self.writer.release();
            self.journal.remove_segment(&self.segment)?;
            self.segment = self.journal.last_segment();
            self.writer = self.segment.acquire_writer(self.journal.codec())?;
            debug!(
                base_index = self.segment.base_index(),
                "truncation moved writer back a segment"
            );
        }

        self.writer.truncate(index)?;
        self.journal.reset_tail(index + 1);
        Ok(())
    }

    /// Forces previously appended bytes to durable storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage flush fails.
    pub fn flush(&mut self) -> JournalResult<()> {
        self.writer.flush()
    }

    /// Releases the writer without flushing.
    ///
    /// Callers needing durability must [`flush`](Self::flush) first.
    pub fn close(mut self) {
        self.writer.release();
    }

    /// Flushes and releases the current writer, then advances the cursor to
    /// the next segment.
    fn move_to_next_segment(&mut self) -> JournalResult<()> {
        self.writer.flush()?;
        let next_index = self.writer.next_index();
        self.writer.release();

        self.segment = self.journal.next_segment(next_index)?;
        self.writer = self.segment.acquire_writer(self.journal.codec())?;
        debug!(
            base_index = self.segment.base_index(),
            "rolled over to next segment"
        );
        Ok(())
    }
}

impl<T: std::fmt::Debug, C: EntryCodec<T>> std::fmt::Debug for JournalWriter<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalWriter")
            .field("segment", &self.segment.base_index())
            .field("last_index", &self.last_index())
            .finish_non_exhaustive()
    }
}
