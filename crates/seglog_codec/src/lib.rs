//! # seglog codec
//!
//! The entry codec boundary for seglog.
//!
//! This is the only place application-specific entry types cross into the
//! journal core. A codec maps an entry to and from its serialized byte form;
//! the journal treats those bytes as opaque and frames them into segments.
//!
//! ## Capacity signaling
//!
//! [`EntryCodec::encode`] writes into a caller-supplied [`EntryBuf`] whose
//! limit is the segment's remaining space. When the serialized form does not
//! fit, encoding fails with [`CodecError::InsufficientCapacity`] - the
//! recoverable "segment full" signal the writer turns into a rollover.
//! Every other codec failure is fatal to the append that caused it.
//!
//! ## Default codec
//!
//! [`CborCodec`] serializes any `serde` type with CBOR, so most embedders
//! never write a codec by hand:
//!
//! ```rust
//! use seglog_codec::{CborCodec, EntryBuf, EntryCodec};
//!
//! let codec = CborCodec::<u64>::new();
//! let mut buf = EntryBuf::with_limit(16);
//! codec.encode(&42u64, &mut buf).unwrap();
//! assert_eq!(codec.decode(1, buf.as_slice()).unwrap(), 42);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod buf;
mod cbor;
mod error;

pub use buf::EntryBuf;
pub use cbor::CborCodec;
pub use error::{CodecError, CodecResult};

/// Bidirectional mapping between an entry type and its serialized bytes.
///
/// Implementations must be pure: `decode(index, bytes)` depends only on its
/// arguments, and `encode` writes the same bytes for the same value.
pub trait EntryCodec<T>: Send + Sync {
    /// Serializes `value` into the destination buffer.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InsufficientCapacity`] when the destination
    /// lacks space for the serialized form - an expected condition the
    /// journal uses to detect end-of-segment - or another [`CodecError`]
    /// for a genuine serialization failure.
    fn encode(&self, value: &T, buf: &mut EntryBuf) -> CodecResult<()>;

    /// Deserializes the entry stored at `index` from `bytes`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes do not describe a valid entry.
    fn decode(&self, index: u64, bytes: &[u8]) -> CodecResult<T>;
}
