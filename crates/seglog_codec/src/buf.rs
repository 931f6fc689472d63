//! Bounded destination buffer for entry encoding.

use crate::error::{CodecError, CodecResult};
use bytes::BytesMut;

/// A destination buffer with a hard byte limit.
///
/// The segment writer hands an `EntryBuf` to the codec sized to the
/// segment's remaining payload space. Writing past the limit fails with
/// [`CodecError::InsufficientCapacity`], which is the explicit
/// "segment full" signal driving rollover - an outcome value, not an
/// exception to re-inspect after the fact.
#[derive(Debug)]
pub struct EntryBuf {
    data: BytesMut,
    limit: usize,
}

impl EntryBuf {
    /// Creates an empty buffer that accepts at most `limit` bytes.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: BytesMut::new(),
            limit,
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the bytes still accepted before the limit.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.limit - self.data.len()
    }

    /// Appends `src` to the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InsufficientCapacity`] if `src` does not fit in
    /// the remaining space. The buffer is left unchanged on failure.
    pub fn put_slice(&mut self, src: &[u8]) -> CodecResult<()> {
        if src.len() > self.remaining() {
            return Err(CodecError::InsufficientCapacity {
                needed: src.len(),
                remaining: self.remaining(),
            });
        }

        self.data.extend_from_slice(src);
        Ok(())
    }

    /// Returns the written bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the buffer, returning the written bytes.
    #[must_use]
    pub fn into_bytes(self) -> bytes::Bytes {
        self.data.freeze()
    }
}
