//! # seglog core
//!
//! The segmented append-only journal underlying a replicated state machine.
//!
//! A [`Journal`] persists an ordered sequence of opaque entries, each
//! addressed by a monotonically increasing index, split across
//! capacity-bounded segments. The consensus layer drives it through a single
//! [`JournalWriter`]:
//!
//! - **append** entries - rollover to a fresh segment is automatic when the
//!   current one fills up;
//! - **commit** a prefix - the commit index only ever advances, and can be
//!   coupled to a durable flush;
//! - **truncate** an uncommitted suffix on leadership change - in place
//!   within a segment, deleting whole segments where possible;
//! - **flush** appended bytes to durable storage, independent of commit.
//!
//! Entry types and serialization are supplied through
//! [`seglog_codec::EntryCodec`]; storage media through
//! [`seglog_storage::StorageProvider`].
//!
//! ## Example
//!
//! ```rust
//! use seglog_codec::CborCodec;
//! use seglog_core::{Journal, JournalConfig, JournalWriter};
//! use seglog_storage::MemoryProvider;
//! use std::sync::Arc;
//!
//! let journal = Arc::new(
//!     Journal::open(
//!         JournalConfig::default(),
//!         Box::new(MemoryProvider::new()),
//!         CborCodec::<String>::new(),
//!     )
//!     .unwrap(),
//! );
//!
//! let mut writer = JournalWriter::new(Arc::clone(&journal)).unwrap();
//! let entry = writer.append(&"set x = 1".to_string()).unwrap();
//! assert_eq!(entry.index(), 1);
//!
//! writer.commit(1).unwrap();
//! assert_eq!(journal.commit_index(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod entry;
mod error;
mod frame;
mod journal;
mod segment;

pub use config::JournalConfig;
pub use entry::IndexedEntry;
pub use error::{JournalError, JournalResult};
pub use frame::FRAME_HEADER_SIZE;
pub use journal::{Journal, JournalWriter};
pub use segment::{Segment, SegmentWriter};
