//! # seglog storage
//!
//! Storage regions and per-segment allocation for seglog.
//!
//! This crate provides the lowest-level storage abstraction of the journal.
//! A [`SegmentStorage`] is an **opaque, capacity-bounded byte region**: it
//! supports appending at the current end, reading at arbitrary offsets,
//! truncating back to an earlier offset, and a durable flush. It does not
//! interpret the bytes it stores - entry framing belongs to the journal core.
//!
//! ## Design Principles
//!
//! - Regions are simple byte stores (append, read, truncate, flush)
//! - Every region has a fixed byte capacity, set at creation
//! - No knowledge of entry framing, indices, or segment bookkeeping
//! - Must be `Send + Sync` so readers can run concurrently with the writer
//!
//! ## Available Regions
//!
//! - [`MemoryStorage`] - for tests and ephemeral journals
//! - [`FileStorage`] - persistent storage using OS file APIs
//!
//! A [`StorageProvider`] allocates and removes the region behind each journal
//! segment: [`MemoryProvider`] keeps regions in process memory,
//! [`DirProvider`] maps each segment to a file in a directory.
//!
//! ## Example
//!
//! ```rust
//! use seglog_storage::{MemoryStorage, SegmentStorage};
//!
//! let mut region = MemoryStorage::with_capacity(64);
//! let offset = region.append(b"hello world").unwrap();
//! let data = region.read_at(offset, 11).unwrap();
//! assert_eq!(&data, b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod provider;
mod region;

pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use provider::{DirProvider, MemoryProvider, StorageProvider};
pub use region::SegmentStorage;
