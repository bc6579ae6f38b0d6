//! Wire format encoding and decoding.
//!
//! Implements the 36-byte frame header:
//! ```text
//! ┌────────┬───────┬────────┬──────────┬──────────┬──────────┬───────────┬──────────┐
//! │ Marker │ Width │ Height │ Stride Y │ Stride U │ Stride V │ Timestamp │ Length   │
//! │ 4 bytes│4 bytes│ 4 bytes│ 4 bytes  │ 4 bytes  │ 4 bytes  │ 8 bytes   │ 4 bytes  │
//! │ "OMT0" │u32 BE │ u32 BE │ u32 BE   │ u32 BE   │ u32 BE   │ u64 BE    │ u32 BE   │
//! └────────┴───────┴────────┴──────────┴──────────┴──────────┴───────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Big Endian. The payload (`Length` bytes)
//! follows immediately.

use serde::Serialize;

/// Frame marker, ASCII "OMT0" read as a big-endian u32.
pub const MARKER: u32 = 0x4F4D_5430;

/// Header size in bytes (fixed, exactly 36).
pub const HEADER_SIZE: usize = 36;

/// Decoded header from wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameHeader {
    /// Framing marker, [`MARKER`] on a well-formed stream.
    pub marker: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Luma plane row stride.
    pub stride_y: u32,
    /// First chroma plane row stride.
    pub stride_u: u32,
    /// Second chroma plane row stride.
    pub stride_v: u32,
    /// Sender-assigned capture timestamp.
    pub timestamp: u64,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl FrameHeader {
    /// Create a new header carrying the protocol marker.
    pub fn new(
        width: u32,
        height: u32,
        strides: [u32; 3],
        timestamp: u64,
        payload_length: u32,
    ) -> Self {
        Self {
            marker: MARKER,
            width,
            height,
            stride_y: strides[0],
            stride_u: strides[1],
            stride_v: strides[2],
            timestamp,
            payload_length,
        }
    }

    /// Encode header to bytes (Big Endian).
    ///
    /// # Example
    ///
    /// ```
    /// use omt_receiver::protocol::{FrameHeader, HEADER_SIZE};
    ///
    /// let header = FrameHeader::new(640, 480, [640, 320, 320], 7, 460_800);
    /// let bytes = header.encode();
    /// assert_eq!(bytes.len(), HEADER_SIZE);
    /// assert_eq!(&bytes[..4], b"OMT0");
    /// ```
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `HEADER_SIZE` (36 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= HEADER_SIZE);
        buf[0..4].copy_from_slice(&self.marker.to_be_bytes());
        buf[4..8].copy_from_slice(&self.width.to_be_bytes());
        buf[8..12].copy_from_slice(&self.height.to_be_bytes());
        buf[12..16].copy_from_slice(&self.stride_y.to_be_bytes());
        buf[16..20].copy_from_slice(&self.stride_u.to_be_bytes());
        buf[20..24].copy_from_slice(&self.stride_v.to_be_bytes());
        buf[24..32].copy_from_slice(&self.timestamp.to_be_bytes());
        buf[32..36].copy_from_slice(&self.payload_length.to_be_bytes());
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short. The marker is not checked
    /// here; see [`FrameHeader::has_valid_marker`].
    ///
    /// # Example
    ///
    /// ```
    /// use omt_receiver::protocol::FrameHeader;
    ///
    /// let original = FrameHeader::new(2, 2, [2, 1, 1], 99, 6);
    /// let header = FrameHeader::decode(&original.encode()).unwrap();
    /// assert_eq!(header.timestamp, 99);
    /// assert_eq!(header.payload_length, 6);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        let buf = buf.get(..HEADER_SIZE)?;
        Some(Self {
            marker: be_u32(&buf[0..4]),
            width: be_u32(&buf[4..8]),
            height: be_u32(&buf[8..12]),
            stride_y: be_u32(&buf[12..16]),
            stride_u: be_u32(&buf[16..20]),
            stride_v: be_u32(&buf[20..24]),
            timestamp: u64::from_be_bytes([
                buf[24], buf[25], buf[26], buf[27], buf[28], buf[29], buf[30], buf[31],
            ]),
            payload_length: be_u32(&buf[32..36]),
        })
    }

    /// Check the framing marker.
    #[inline]
    pub fn has_valid_marker(&self) -> bool {
        self.marker == MARKER
    }

    /// Payload length as a buffer size.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload_length as usize
    }

    /// Row strides in plane order (Y, U, V).
    #[inline]
    pub fn strides(&self) -> [u32; 3] {
        [self.stride_y, self.stride_u, self.stride_v]
    }
}

#[inline]
fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
