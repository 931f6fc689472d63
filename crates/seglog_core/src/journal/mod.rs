//! The segmented journal.
//!
//! A [`Journal`] owns the ordered collection of segments, the global commit
//! index, and the flush-on-commit policy. It creates segments lazily - on
//! rollover or when resetting to an arbitrary index - and removes them when
//! truncation discards a whole-segment suffix.
//!
//! All mutation flows through a single [`JournalWriter`] created over the
//! journal.

mod writer;

pub use writer::JournalWriter;

use crate::config::JournalConfig;
use crate::error::JournalResult;
use crate::segment::Segment;
use parking_lot::RwLock;
use seglog_codec::EntryCodec;
use seglog_storage::StorageProvider;
use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// The ordered, segmented append-only log.
///
/// Generic over the entry type `T` and the [`EntryCodec`] that maps entries
/// to bytes. Segment storage is allocated through a [`StorageProvider`], so
/// the same journal runs over memory regions in tests and files in
/// production.
pub struct Journal<T, C> {
    config: JournalConfig,
    provider: Box<dyn StorageProvider>,
    codec: Arc<C>,
    /// Segments keyed by base index; always non-empty, keys strictly
    /// ascending, covering disjoint contiguous index ranges.
    segments: RwLock<BTreeMap<u64, Segment>>,
    /// Highest index safe to expose to replicas; never decreases.
    commit_index: AtomicU64,
    /// First valid index, as last signalled to readers via `reset_head`.
    head_index: AtomicU64,
    /// First invalid index past the tail, as last signalled via
    /// `reset_tail`. `u64::MAX` until a truncation occurs.
    tail_index: AtomicU64,
    _entry: PhantomData<fn() -> T>,
}

impl<T, C> Journal<T, C>
where
    T: Clone,
    C: EntryCodec<T>,
{
    /// Opens a journal over whatever segments `provider` already holds,
    /// creating the initial segment when there are none.
    ///
    /// The commit index always starts at zero; persisting it across
    /// restarts belongs to the consensus layer.
    ///
    /// # Panics
    ///
    /// Panics if `config.initial_index` is zero.
    ///
    /// # Errors
    ///
    /// Returns an error if segment storage cannot be enumerated or opened.
    pub fn open(
        config: JournalConfig,
        provider: Box<dyn StorageProvider>,
        codec: C,
    ) -> JournalResult<Self> {
        assert!(config.initial_index >= 1, "initial index must be at least 1");

        let mut segments = BTreeMap::new();
        for base in provider.list()? {
            let storage = provider.open(base, config.max_segment_size)?;
            segments.insert(base, Segment::new(base, storage));
        }

        if segments.is_empty() {
            let base = config.initial_index;
            let storage = provider.open(base, config.max_segment_size)?;
            segments.insert(base, Segment::new(base, storage));
            debug!(base_index = base, "created initial segment");
        }

        let head = *segments
            .keys()
            .next()
            .expect("journal always has at least one segment");

        Ok(Self {
            config,
            provider,
            codec: Arc::new(codec),
            segments: RwLock::new(segments),
            commit_index: AtomicU64::new(0),
            head_index: AtomicU64::new(head),
            tail_index: AtomicU64::new(u64::MAX),
            _entry: PhantomData,
        })
    }

    /// Returns the segment that would follow a writer positioned at
    /// `next_index`, creating it if it does not yet exist.
    ///
    /// # Errors
    ///
    /// Returns an error if new segment storage cannot be allocated.
    pub(crate) fn next_segment(&self, next_index: u64) -> JournalResult<Segment> {
        let mut segments = self.segments.write();
        if let Some(segment) = segments.get(&next_index) {
            return Ok(segment.clone());
        }

        let storage = self.provider.open(next_index, self.config.max_segment_size)?;
        let segment = Segment::new(next_index, storage);
        segments.insert(next_index, segment.clone());
        debug!(base_index = next_index, "created segment");
        Ok(segment)
    }

    /// Discards every segment and creates a fresh one based at `index`.
    ///
    /// Used when resetting the journal to an arbitrary point, e.g. after
    /// installing a snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if old storage cannot be removed or new storage
    /// cannot be allocated.
    pub(crate) fn reset_segments(&self, index: u64) -> JournalResult<Segment> {
        let mut segments = self.segments.write();

        let bases: Vec<u64> = segments.keys().copied().collect();
        for base in bases {
            self.provider.remove(base)?;
        }
        segments.clear();

        let storage = self.provider.open(index, self.config.max_segment_size)?;
        let segment = Segment::new(index, storage);
        segments.insert(index, segment.clone());
        debug!(base_index = index, "reset journal to fresh segment");
        Ok(segment)
    }

    /// Permanently deletes a segment and its storage.
    ///
    /// Only valid for segments at or after the write cursor during suffix
    /// truncation.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment's storage cannot be removed.
    pub(crate) fn remove_segment(&self, segment: &Segment) -> JournalResult<()> {
        let mut segments = self.segments.write();
        segments.remove(&segment.base_index());
        self.provider.remove(segment.base_index())?;
        debug!(base_index = segment.base_index(), "removed segment");
        Ok(())
    }
}

impl<T, C> Journal<T, C> {
    /// Returns the segment with the lowest base index.
    #[must_use]
    pub fn first_segment(&self) -> Segment {
        self.segments
            .read()
            .first_key_value()
            .map(|(_, segment)| segment.clone())
            .expect("journal always has at least one segment")
    }

    /// Returns the segment with the highest base index.
    #[must_use]
    pub fn last_segment(&self) -> Segment {
        self.segments
            .read()
            .last_key_value()
            .map(|(_, segment)| segment.clone())
            .expect("journal always has at least one segment")
    }

    /// Returns the number of live segments.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.read().len()
    }

    /// Returns the base index of every live segment, in ascending order.
    #[must_use]
    pub fn segment_bases(&self) -> Vec<u64> {
        self.segments.read().keys().copied().collect()
    }

    /// Returns the highest index marked safe to expose.
    #[must_use]
    pub fn commit_index(&self) -> u64 {
        self.commit_index.load(Ordering::Acquire)
    }

    /// Stores the commit index.
    ///
    /// Monotonicity is enforced by the [`JournalWriter`] facade, which only
    /// calls this with advancing values.
    pub(crate) fn set_commit_index(&self, index: u64) {
        self.commit_index.store(index, Ordering::Release);
    }

    /// Returns whether every commit-index advance forces a flush.
    #[must_use]
    pub fn flush_on_commit(&self) -> bool {
        self.config.flush_on_commit
    }

    /// Signals readers that `index` is now the first valid index.
    ///
    /// Reader cursors positioned before it must reposition; the reader
    /// component itself lives outside this crate.
    pub fn reset_head(&self, index: u64) {
        self.head_index.store(index, Ordering::Release);
        debug!(index, "reset journal head");
    }

    /// Signals readers that `index` is now the first invalid index past the
    /// tail.
    ///
    /// Reader cursors positioned at or beyond it must reposition.
    pub fn reset_tail(&self, index: u64) {
        self.tail_index.store(index, Ordering::Release);
        debug!(index, "reset journal tail");
    }

    /// Returns the first valid index, as last signalled to readers.
    #[must_use]
    pub fn head_index(&self) -> u64 {
        self.head_index.load(Ordering::Acquire)
    }

    /// Returns the reader tail fence: the first invalid index past the
    /// tail, or `u64::MAX` if no truncation has occurred.
    #[must_use]
    pub fn tail_index(&self) -> u64 {
        self.tail_index.load(Ordering::Acquire)
    }

    pub(crate) fn codec(&self) -> Arc<C> {
        Arc::clone(&self.codec)
    }
}

impl<T, C> std::fmt::Debug for Journal<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("segments", &self.segment_bases())
            .field("commit_index", &self.commit_index())
            .field("flush_on_commit", &self.flush_on_commit())
            .finish_non_exhaustive()
    }
}
