//! File-based storage region for persistent segments.

use crate::error::{StorageError, StorageResult};
use crate::region::SegmentStorage;
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based storage region.
///
/// This region provides persistent segment storage using OS file APIs.
/// Data survives process restarts.
///
/// # Durability
///
/// `flush()` pushes buffered writes to the OS and then calls
/// `File::sync_data()`, so a successful flush means the appended bytes are on
/// disk. File metadata is synced on truncation.
///
/// # Thread Safety
///
/// The region is thread-safe: internal locking keeps concurrent reader access
/// consistent with the single writer.
///
/// # Example
///
/// ```no_run
/// use seglog_storage::{FileStorage, SegmentStorage};
/// use std::path::Path;
///
/// let mut region = FileStorage::open(Path::new("00000000000000000001.seg"), 1024).unwrap();
/// region.append(b"persistent data").unwrap();
/// region.flush().unwrap();
/// ```
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    file: RwLock<File>,
    len: RwLock<u64>,
    capacity: u64,
}

impl FileStorage {
    /// Opens or creates a file region at the given path.
    ///
    /// If the file exists, its current contents are kept and the next append
    /// goes at the end. The capacity applies to new writes regardless of how
    /// the file was produced.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or created.
    pub fn open(path: &Path, capacity: u64) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            len: RwLock::new(len),
            capacity,
        })
    }

    /// Opens or creates a file region, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or the file cannot
    /// be opened.
    pub fn open_with_create_dirs(path: &Path, capacity: u64) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::open(path, capacity)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SegmentStorage for FileStorage {
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn len(&self) -> StorageResult<u64> {
        Ok(*self.len.read())
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        let mut file = self.file.write();
        let mut len = self.len.write();

        let offset = *len;
        let remaining = self.capacity - offset;

        if data.len() as u64 > remaining {
            return Err(StorageError::RegionFull {
                requested: data.len(),
                remaining,
                capacity: self.capacity,
            });
        }

        file.seek(SeekFrom::Start(offset))?;
        file.write_all(data)?;
        *len += data.len() as u64;

        Ok(offset)
    }

    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = *self.len.read();
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn truncate(&mut self, new_len: u64) -> StorageResult<()> {
        let file = self.file.write();
        let mut len = self.len.write();

        if new_len > *len {
            return Err(StorageError::TruncatePastEnd {
                new_len,
                len: *len,
            });
        }

        file.set_len(new_len)?;
        file.sync_all()?;
        *len = new_len;

        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        let mut file = self.file.write();
        file.flush()?;
        file.sync_data()?;
        Ok(())
    }
}
