//! Journal configuration.

/// Configuration for opening a journal.
#[derive(Debug, Clone)]
pub struct JournalConfig {
    /// Index of the first entry a fresh journal will accept.
    ///
    /// Must be at least 1.
    pub initial_index: u64,

    /// Fixed byte capacity of each segment.
    pub max_segment_size: u64,

    /// Whether every commit-index advance forces a flush.
    ///
    /// `true` couples durability to commit acknowledgment; `false` leaves
    /// flushing to explicit `flush()` calls for throughput.
    pub flush_on_commit: bool,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            initial_index: 1,
            max_segment_size: 32 * 1024 * 1024, // 32 MB
            flush_on_commit: true,
        }
    }
}

impl JournalConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the index of the first entry.
    #[must_use]
    pub const fn initial_index(mut self, index: u64) -> Self {
        self.initial_index = index;
        self
    }

    /// Sets the fixed byte capacity of each segment.
    #[must_use]
    pub const fn max_segment_size(mut self, size: u64) -> Self {
        self.max_segment_size = size;
        self
    }

    /// Sets whether every commit forces a flush.
    #[must_use]
    pub const fn flush_on_commit(mut self, value: bool) -> Self {
        self.flush_on_commit = value;
        self
    }
}
