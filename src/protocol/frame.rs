//! Frame struct with typed accessors.
//!
//! Represents a complete protocol frame with header and payload.
//! Uses `bytes::Bytes` so the payload can be handed to a sink without copying.
//!
//! # Example
//!
//! ```
//! use omt_receiver::protocol::{Frame, FrameHeader};
//! use bytes::Bytes;
//!
//! let header = FrameHeader::new(2, 2, [2, 1, 1], 0, 6);
//! let frame = Frame::new(header, Bytes::from_static(b"YYYYUV"));
//!
//! assert_eq!(frame.width(), 2);
//! assert_eq!(frame.payload(), b"YYYYUV");
//! ```

use bytes::Bytes;

use super::wire_format::{FrameHeader, HEADER_SIZE};

/// A complete protocol frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Decoded header.
    pub header: FrameHeader,
    /// Payload bytes, exactly `header.payload_length` long.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from header and payload.
    pub fn new(header: FrameHeader, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take the payload, dropping the header.
    #[inline]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.header.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.header.height
    }

    #[inline]
    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }
}

/// Build a complete frame as a single byte vector.
///
/// Encodes header and appends payload into a contiguous buffer. The header's
/// `payload_length` is written as given; callers building well-formed
/// frames should set it to `payload.len()`.
///
/// # Example
///
/// ```
/// use omt_receiver::protocol::{build_frame, FrameHeader, HEADER_SIZE};
///
/// let header = FrameHeader::new(2, 2, [2, 1, 1], 0, 6);
/// let bytes = build_frame(&header, b"YYYYUV");
/// assert_eq!(bytes.len(), HEADER_SIZE + 6);
/// ```
pub fn build_frame(header: &FrameHeader, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}
