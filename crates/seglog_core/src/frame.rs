//! Binary entry framing.
//!
//! Each entry occupies one frame within its segment:
//!
//! ```text
//! | length (4, LE) | crc32 (4, LE) | payload (length bytes) |
//! ```
//!
//! `length` counts only the payload; `crc32` covers the payload. Frames are
//! written back-to-back in index order, so a segment scan is a single
//! forward walk.

/// Bytes of framing overhead per entry.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Builds the frame for `payload`: header followed by the payload bytes.
pub(crate) fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Splits a frame header into `(payload_len, crc32)`.
pub(crate) fn decode_header(header: &[u8]) -> (u32, u32) {
    debug_assert_eq!(header.len(), FRAME_HEADER_SIZE);
    let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    (len, crc)
}

/// Returns `true` if `crc` matches the payload's checksum.
pub(crate) fn verify(payload: &[u8], crc: u32) -> bool {
    crc32fast::hash(payload) == crc
}
