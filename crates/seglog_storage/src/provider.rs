//! Allocation of storage regions for journal segments.

use crate::error::{StorageError, StorageResult};
use crate::file::FileStorage;
use crate::memory::MemoryStorage;
use crate::region::SegmentStorage;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// File extension used for on-disk segment regions.
const SEGMENT_EXTENSION: &str = "seg";

/// Allocates and removes the storage region behind each journal segment.
///
/// The journal creates segments lazily - on rollover, or when resetting to an
/// arbitrary index - and deletes them during suffix truncation. Providers are
/// the hook through which those lifecycle events reach the storage medium.
///
/// Regions are keyed by the segment's base index.
pub trait StorageProvider: Send + Sync {
    /// Opens the region for the segment based at `base_index`, creating it
    /// if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the region cannot be created or opened.
    fn open(&self, base_index: u64, capacity: u64) -> StorageResult<Box<dyn SegmentStorage>>;

    /// Permanently removes the region for the segment based at `base_index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the region exists but cannot be removed.
    fn remove(&self, base_index: u64) -> StorageResult<()>;

    /// Lists the base indices of regions this provider already holds,
    /// in ascending order.
    ///
    /// Used when opening a journal over pre-existing storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying medium cannot be enumerated.
    fn list(&self) -> StorageResult<Vec<u64>>;
}

/// A provider that keeps every region in process memory.
///
/// Cloning the provider shares its registry, so a test can hold one clone,
/// hand the other to the journal, and observe region contents and flush
/// counts through [`MemoryProvider::region`].
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    regions: Arc<Mutex<BTreeMap<u64, MemoryStorage>>>,
}

impl MemoryProvider {
    /// Creates a provider with no regions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the region based at `base_index`, if it exists.
    #[must_use]
    pub fn region(&self, base_index: u64) -> Option<MemoryStorage> {
        self.regions.lock().get(&base_index).cloned()
    }
}

impl StorageProvider for MemoryProvider {
    fn open(&self, base_index: u64, capacity: u64) -> StorageResult<Box<dyn SegmentStorage>> {
        let mut regions = self.regions.lock();
        let region = regions
            .entry(base_index)
            .or_insert_with(|| MemoryStorage::with_capacity(capacity));
        Ok(Box::new(region.clone()))
    }

    fn remove(&self, base_index: u64) -> StorageResult<()> {
        self.regions.lock().remove(&base_index);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<u64>> {
        Ok(self.regions.lock().keys().copied().collect())
    }
}

/// A provider that maps each segment to a file in a directory.
///
/// Segment files are named by their zero-padded base index,
/// e.g. `00000000000000000001.seg`, so a lexicographic directory listing
/// yields segments in index order.
#[derive(Debug)]
pub struct DirProvider {
    dir: PathBuf,
}

impl DirProvider {
    /// Creates a provider rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: &Path) -> StorageResult<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Returns the directory holding the segment files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn segment_path(&self, base_index: u64) -> PathBuf {
        self.dir
            .join(format!("{base_index:020}.{SEGMENT_EXTENSION}"))
    }
}

impl StorageProvider for DirProvider {
    fn open(&self, base_index: u64, capacity: u64) -> StorageResult<Box<dyn SegmentStorage>> {
        let region = FileStorage::open(&self.segment_path(base_index), capacity)?;
        Ok(Box::new(region))
    }

    fn remove(&self, base_index: u64) -> StorageResult<()> {
        std::fs::remove_file(self.segment_path(base_index))?;
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<u64>> {
        let mut bases = Vec::new();

        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SEGMENT_EXTENSION) {
                continue;
            }

            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| StorageError::InvalidSegmentName {
                    name: path.display().to_string(),
                })?;

            let base = stem
                .parse::<u64>()
                .map_err(|_| StorageError::InvalidSegmentName {
                    name: stem.to_string(),
                })?;

            bases.push(base);
        }

        bases.sort_unstable();
        Ok(bases)
    }
}
