//! Default CBOR entry codec.

use crate::buf::EntryBuf;
use crate::error::{CodecError, CodecResult};
use crate::EntryCodec;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A CBOR codec for any `serde`-serializable entry type.
///
/// Serializes the entry with `ciborium`, then moves the result into the
/// bounded destination so capacity exhaustion surfaces as
/// [`CodecError::InsufficientCapacity`].
///
/// # Example
///
/// ```rust
/// use seglog_codec::{CborCodec, EntryBuf, EntryCodec};
///
/// let codec = CborCodec::<String>::new();
/// let mut buf = EntryBuf::with_limit(64);
/// codec.encode(&"hello".to_string(), &mut buf).unwrap();
///
/// let decoded = codec.decode(1, buf.as_slice()).unwrap();
/// assert_eq!(decoded, "hello");
/// ```
#[derive(Debug)]
pub struct CborCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> CborCodec<T> {
    /// Creates a new CBOR codec.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for CborCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for CborCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> EntryCodec<T> for CborCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &T, buf: &mut EntryBuf) -> CodecResult<()> {
        let mut payload = Vec::new();
        ciborium::into_writer(value, &mut payload)
            .map_err(|e| CodecError::encoding_failed(e.to_string()))?;
        buf.put_slice(&payload)
    }

    fn decode(&self, _index: u64, bytes: &[u8]) -> CodecResult<T> {
        ciborium::from_reader(bytes).map_err(|e| CodecError::decoding_failed(e.to_string()))
    }
}
