//! End-to-end journal tests: rollover, truncation, commit/flush coupling,
//! and persistence across reopen.

use seglog_codec::CborCodec;
use seglog_core::{Journal, JournalConfig, JournalWriter};
use seglog_storage::{DirProvider, MemoryProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A seven-character entry: one CBOR header byte + 7 bytes of text, so
/// every frame is exactly 16 bytes and segment capacity math is exact.
fn entry(i: u64) -> String {
    format!("e{i:06}")
}

const ENTRY_FRAME_SIZE: u64 = 16;

fn memory_journal(
    config: JournalConfig,
) -> (Arc<Journal<String, CborCodec<String>>>, MemoryProvider) {
    let provider = MemoryProvider::new();
    let journal = Journal::open(config, Box::new(provider.clone()), CborCodec::new()).unwrap();
    (Arc::new(journal), provider)
}

/// Capacity for exactly `n` test entries per segment.
fn capacity_for(n: u64) -> u64 {
    n * ENTRY_FRAME_SIZE
}

#[test]
fn appends_are_contiguous_within_one_segment() {
    let (journal, _) = memory_journal(JournalConfig::default());
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=20 {
        let indexed = writer.append(&entry(i)).unwrap();
        assert_eq!(indexed.index(), i);
        assert_eq!(writer.last_index(), i);
        assert_eq!(writer.next_index(), i + 1);
    }

    assert_eq!(journal.segment_count(), 1);
}

#[test]
fn appends_are_contiguous_across_rollovers() {
    let config = JournalConfig::new().max_segment_size(capacity_for(3));
    let (journal, _) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=10 {
        let indexed = writer.append(&entry(i)).unwrap();
        assert_eq!(indexed.index(), i);
    }

    assert_eq!(writer.last_index(), 10);
    assert_eq!(writer.last_entry().unwrap().entry(), &entry(10));
    // Three entries per segment: segments start at 1, 4, 7, 10.
    assert_eq!(journal.segment_bases(), vec![1, 4, 7, 10]);
}

#[test]
fn rollover_starts_next_segment_at_next_index() {
    let config = JournalConfig::new().max_segment_size(capacity_for(5));
    let (journal, _) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=5 {
        writer.append(&entry(i)).unwrap();
    }
    assert_eq!(journal.segment_count(), 1);

    writer.append(&entry(6)).unwrap();
    assert_eq!(journal.segment_bases(), vec![1, 6]);
    assert_eq!(journal.last_segment().base_index(), 6);
}

#[test]
fn oversized_entry_on_fresh_journal_is_fatal() {
    let config = JournalConfig::new().max_segment_size(32);
    let (journal, _) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    // Payload is 31 bytes; an empty 32-byte segment offers only 24.
    let oversized = "x".repeat(30);
    let err = writer.append(&oversized).unwrap_err();
    assert!(err.is_segment_full());

    // Nothing was written and no index was consumed.
    assert_eq!(writer.last_index(), 0);
    assert_eq!(journal.segment_count(), 1);
}

#[test]
fn oversized_entry_after_rollover_is_fatal() {
    let config = JournalConfig::new().max_segment_size(capacity_for(3));
    let (journal, _) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    writer.append(&entry(1)).unwrap();
    writer.append(&entry(2)).unwrap();

    // Needs more payload space than an empty 48-byte segment's 40.
    let oversized = "y".repeat(45);
    let err = writer.append(&oversized).unwrap_err();
    assert!(err.is_segment_full());

    // The failed retry left an empty rollover segment behind; appends
    // continue contiguously into it.
    assert_eq!(writer.next_index(), 3);
    let indexed = writer.append(&entry(3)).unwrap();
    assert_eq!(indexed.index(), 3);
}

#[test]
fn append_indexed_replays_entries_with_rollover() {
    let (source, _) = memory_journal(JournalConfig::default());
    let mut source_writer = JournalWriter::new(Arc::clone(&source)).unwrap();

    let config = JournalConfig::new().max_segment_size(capacity_for(3));
    let (target, _) = memory_journal(config);
    let mut target_writer = JournalWriter::new(Arc::clone(&target)).unwrap();

    for i in 1..=8 {
        let indexed = source_writer.append(&entry(i)).unwrap();
        target_writer.append_indexed(&indexed).unwrap();
    }

    assert_eq!(target_writer.last_index(), 8);
    assert_eq!(target.segment_bases(), vec![1, 4, 7]);
}

#[test]
fn commit_index_is_monotonic() {
    let (journal, _) = memory_journal(JournalConfig::default());
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=10 {
        writer.append(&entry(i)).unwrap();
    }

    writer.commit(7).unwrap();
    assert_eq!(journal.commit_index(), 7);

    // A lower commit is ignored, not an error.
    writer.commit(3).unwrap();
    assert_eq!(journal.commit_index(), 7);

    writer.commit(9).unwrap();
    assert_eq!(journal.commit_index(), 9);
}

#[test]
fn commit_flushes_only_when_policy_demands() {
    let config = JournalConfig::new().flush_on_commit(true);
    let (journal, provider) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    writer.append(&entry(1)).unwrap();
    writer.append(&entry(2)).unwrap();

    let region = provider.region(1).unwrap();
    let before = region.flush_count();

    writer.commit(1).unwrap();
    assert_eq!(region.flush_count(), before + 1);

    // No advance, no flush.
    writer.commit(1).unwrap();
    writer.commit(0).unwrap();
    assert_eq!(region.flush_count(), before + 1);

    writer.commit(2).unwrap();
    assert_eq!(region.flush_count(), before + 2);
}

#[test]
fn commit_never_flushes_when_policy_off() {
    let config = JournalConfig::new().flush_on_commit(false);
    let (journal, provider) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    writer.append(&entry(1)).unwrap();
    writer.append(&entry(2)).unwrap();

    let region = provider.region(1).unwrap();
    let before = region.flush_count();

    writer.commit(1).unwrap();
    writer.commit(2).unwrap();
    assert_eq!(region.flush_count(), before);

    // Explicit flush still works.
    writer.flush().unwrap();
    assert_eq!(region.flush_count(), before + 1);
}

#[test]
fn truncate_within_current_segment() {
    let (journal, _) = memory_journal(JournalConfig::default());
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=10 {
        writer.append(&entry(i)).unwrap();
    }

    writer.truncate(6).unwrap();
    assert_eq!(writer.last_index(), 6);
    assert_eq!(writer.last_entry().unwrap().entry(), &entry(6));
    assert_eq!(journal.tail_index(), 7);

    // Indices 7.. are reused by subsequent appends.
    let indexed = writer.append(&entry(7)).unwrap();
    assert_eq!(indexed.index(), 7);
}

#[test]
fn truncate_is_idempotent() {
    let (journal, _) = memory_journal(JournalConfig::default());
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=10 {
        writer.append(&entry(i)).unwrap();
    }

    writer.truncate(4).unwrap();
    assert_eq!(writer.last_index(), 4);

    writer.truncate(4).unwrap();
    assert_eq!(writer.last_index(), 4);

    // Truncating at or beyond the tail is a no-op too.
    writer.truncate(100).unwrap();
    assert_eq!(writer.last_index(), 4);
}

#[test]
fn truncate_deletes_whole_segments() {
    let config = JournalConfig::new().max_segment_size(capacity_for(99));
    let (journal, provider) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=250 {
        writer.append(&entry(i)).unwrap();
    }
    assert_eq!(journal.segment_bases(), vec![1, 100, 199]);

    writer.truncate(50).unwrap();

    assert_eq!(writer.last_index(), 50);
    assert_eq!(journal.segment_bases(), vec![1]);
    assert_eq!(journal.tail_index(), 51);

    // The removed segments' storage is gone.
    assert!(provider.region(100).is_none());
    assert!(provider.region(199).is_none());

    // The journal keeps working past the new tail.
    let indexed = writer.append(&entry(51)).unwrap();
    assert_eq!(indexed.index(), 51);
}

#[test]
fn truncate_never_deletes_first_segment() {
    let config = JournalConfig::new().max_segment_size(capacity_for(3));
    let (journal, _) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=7 {
        writer.append(&entry(i)).unwrap();
    }

    // Below the first segment's range: everything goes, the first segment
    // stays, emptied in place.
    writer.truncate(0).unwrap();
    assert_eq!(journal.segment_bases(), vec![1]);
    assert_eq!(writer.last_index(), 0);
    assert_eq!(writer.next_index(), 1);
}

#[test]
#[should_panic(expected = "cannot truncate committed index")]
fn truncate_below_commit_index_panics() {
    let (journal, _) = memory_journal(JournalConfig::default());
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=10 {
        writer.append(&entry(i)).unwrap();
    }
    writer.commit(6).unwrap();

    let _ = writer.truncate(5);
}

#[test]
fn reset_forward_rebuilds_segments() {
    let config = JournalConfig::new().max_segment_size(capacity_for(3));
    let (journal, _) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=5 {
        writer.append(&entry(i)).unwrap();
    }

    writer.reset(100).unwrap();

    assert_eq!(journal.segment_bases(), vec![100]);
    assert_eq!(writer.next_index(), 100);
    assert_eq!(journal.head_index(), 100);

    let indexed = writer.append(&entry(100)).unwrap();
    assert_eq!(indexed.index(), 100);
}

#[test]
fn reset_backward_truncates() {
    let config = JournalConfig::new().max_segment_size(capacity_for(3));
    let (journal, _) = memory_journal(config);
    let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    for i in 1..=5 {
        writer.append(&entry(i)).unwrap();
    }
    assert_eq!(journal.segment_bases(), vec![1, 4]);

    writer.reset(2).unwrap();

    assert_eq!(writer.next_index(), 2);
    assert_eq!(writer.last_index(), 1);
    assert_eq!(journal.segment_bases(), vec![1]);
    assert_eq!(journal.head_index(), 2);
}

#[test]
fn last_entry_survives_writer_reacquisition() {
    let provider = MemoryProvider::new();
    let config = JournalConfig::new().max_segment_size(capacity_for(3));

    {
        let journal: Arc<Journal<String, CborCodec<String>>> = Arc::new(
            Journal::open(config.clone(), Box::new(provider.clone()), CborCodec::new()).unwrap(),
        );
        let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();
        for i in 1..=5 {
            writer.append(&entry(i)).unwrap();
        }
        writer.flush().unwrap();
        writer.close();
    }

    // A second journal over the same provider sees the same segments and
    // resumes at the right position.
    let journal: Arc<Journal<String, CborCodec<String>>> =
        Arc::new(Journal::open(config, Box::new(provider.clone()), CborCodec::new()).unwrap());
    let writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    assert_eq!(journal.segment_bases(), vec![1, 4]);
    assert_eq!(writer.last_index(), 5);
    assert_eq!(writer.last_entry().unwrap().entry(), &entry(5));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Command {
    term: u64,
    op: String,
}

#[test]
fn struct_entries_roundtrip_through_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = JournalConfig::new().max_segment_size(1024);

    let commands: Vec<Command> = (1..=30u64)
        .map(|i| Command {
            term: i / 10 + 1,
            op: format!("put k{i}"),
        })
        .collect();

    {
        let provider = DirProvider::new(dir.path()).unwrap();
        let journal: Arc<Journal<Command, CborCodec<Command>>> =
            Arc::new(Journal::open(config.clone(), Box::new(provider), CborCodec::new()).unwrap());
        let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

        for command in &commands {
            writer.append(command).unwrap();
        }
        writer.commit(30).unwrap();
        writer.close();
    }

    let provider = DirProvider::new(dir.path()).unwrap();
    let journal: Arc<Journal<Command, CborCodec<Command>>> =
        Arc::new(Journal::open(config, Box::new(provider), CborCodec::new()).unwrap());
    let writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    assert_eq!(writer.last_index(), 30);
    assert_eq!(writer.last_entry().unwrap().entry(), &commands[29]);
}

#[test]
fn file_backed_truncation_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = JournalConfig::new().max_segment_size(capacity_for(4));

    {
        let provider = DirProvider::new(dir.path()).unwrap();
        let journal: Arc<Journal<String, CborCodec<String>>> =
            Arc::new(Journal::open(config.clone(), Box::new(provider), CborCodec::new()).unwrap());
        let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

        for i in 1..=10 {
            writer.append(&entry(i)).unwrap();
        }
        writer.truncate(6).unwrap();
        writer.flush().unwrap();
        writer.close();
    }

    let provider = DirProvider::new(dir.path()).unwrap();
    let journal: Arc<Journal<String, CborCodec<String>>> =
        Arc::new(Journal::open(config, Box::new(provider), CborCodec::new()).unwrap());
    let writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

    assert_eq!(writer.last_index(), 6);
    assert_eq!(writer.last_entry().unwrap().entry(), &entry(6));
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Contiguity holds for arbitrary entry sizes across any number of
        /// rollovers.
        #[test]
        fn contiguity_across_rollovers(
            entries in proptest::collection::vec("[a-z]{0,40}", 1..120),
        ) {
            let config = JournalConfig::new().max_segment_size(128);
            let (journal, _) = memory_journal(config);
            let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

            for (n, s) in entries.iter().enumerate() {
                let indexed = writer.append(s).unwrap();
                prop_assert_eq!(indexed.index(), n as u64 + 1);
            }
            prop_assert_eq!(writer.last_index(), entries.len() as u64);

            // Segment bases are strictly ascending and start at 1.
            let bases = journal.segment_bases();
            prop_assert_eq!(bases[0], 1);
            prop_assert!(bases.windows(2).all(|w| w[0] < w[1]));
        }

        /// What the writer reports as its last entry always matches what was
        /// appended, including after truncation.
        #[test]
        fn last_entry_tracks_appends_and_truncations(
            count in 1u64..40,
            cut in 0u64..40,
        ) {
            let config = JournalConfig::new().max_segment_size(capacity_for(5));
            let (journal, _) = memory_journal(config);
            let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();

            for i in 1..=count {
                writer.append(&entry(i)).unwrap();
            }

            writer.truncate(cut).unwrap();
            let expected = cut.min(count);
            prop_assert_eq!(writer.last_index(), expected);
            if expected >= 1 {
                prop_assert_eq!(writer.last_entry().unwrap().entry(), &entry(expected));
            } else {
                prop_assert!(writer.last_entry().is_none());
            }
        }
    }
}
