//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` as the accumulation buffer. Consumed bytes are
//! split off the front, so the allocation is reused once earlier payloads
//! are dropped. Implements the push half of the framing state machine:
//! - `AwaitingHeader`: Need at least 36 bytes
//! - `AwaitingPayload`: Header parsed, need `payload_length` bytes
//!
//! # Example
//!
//! ```
//! use omt_receiver::protocol::{build_frame, FrameBuffer, FrameHeader};
//!
//! let mut buffer = FrameBuffer::new();
//! let bytes = build_frame(&FrameHeader::new(2, 2, [2, 1, 1], 0, 6), b"YYYYUV");
//!
//! // Data arrives in chunks from the socket
//! assert!(buffer.push(&bytes[..20]).unwrap().is_empty());
//! let frames = buffer.push(&bytes[20..]).unwrap();
//! assert_eq!(frames[0].payload(), b"YYYYUV");
//! ```

use bytes::BytesMut;

use super::wire_format::{FrameHeader, HEADER_SIZE};
use super::Frame;
use crate::error::DecodeError;

/// Default initial capacity of the accumulation buffer.
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// State machine for frame parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    /// Waiting for a complete header (need 36 bytes).
    AwaitingHeader,
    /// Header parsed and consumed, waiting for payload bytes.
    AwaitingPayload { header: FrameHeader },
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
///
/// Bytes past the current requirement stay buffered for the next step.
pub struct FrameBuffer {
    /// Accumulated bytes from socket reads.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Optional payload size limit.
    max_payload_size: Option<u32>,
}

impl FrameBuffer {
    /// Create a new frame buffer with default settings.
    ///
    /// Default capacity: 64KB, no payload limit.
    pub fn new() -> Self {
        Self::with_capacity_and_max_payload(DEFAULT_BUFFER_CAPACITY, None)
    }

    /// Create a new frame buffer that rejects payloads above `max_payload_size`.
    pub fn with_max_payload(max_payload_size: u32) -> Self {
        Self::with_capacity_and_max_payload(DEFAULT_BUFFER_CAPACITY, Some(max_payload_size))
    }

    /// Create a new frame buffer with custom capacity and payload limit.
    pub fn with_capacity_and_max_payload(capacity: usize, max_payload_size: Option<u32>) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
            state: State::AwaitingHeader,
            max_payload_size,
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Partial data is buffered internally for the next push.
    ///
    /// # Errors
    ///
    /// Returns an error on a bad marker or an oversized payload. The buffer
    /// is left untouched at the offending header.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>, DecodeError> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract()? {
            frames.push(frame);
        }

        Ok(frames)
    }

    /// Try to extract a single frame from the buffer.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` if a complete frame was extracted
    /// - `Ok(None)` if more data is needed
    /// - `Err(...)` on a framing violation
    pub fn try_extract(&mut self) -> Result<Option<Frame>, DecodeError> {
        loop {
            match self.state {
                State::AwaitingHeader => {
                    let Some(header) = FrameHeader::decode(&self.buffer) else {
                        return Ok(None);
                    };

                    if !header.has_valid_marker() {
                        return Err(DecodeError::BadMarker {
                            found: header.marker,
                        });
                    }

                    if let Some(max) = self.max_payload_size {
                        if header.payload_length > max {
                            return Err(DecodeError::PayloadTooLarge {
                                length: header.payload_length,
                                max,
                            });
                        }
                    }

                    let _ = self.buffer.split_to(HEADER_SIZE);
                    self.state = State::AwaitingPayload { header };
                    tracing::debug!(
                        payload_length = header.payload_length,
                        timestamp = header.timestamp,
                        "header decoded"
                    );
                }

                State::AwaitingPayload { header } => {
                    let remaining = header.payload_len();
                    if self.buffer.len() < remaining {
                        return Ok(None);
                    }

                    // The split-off region is never written again by this buffer.
                    let payload = self.buffer.split_to(remaining).freeze();
                    self.state = State::AwaitingHeader;

                    return Ok(Some(Frame::new(header, payload)));
                }
            }
        }
    }

    /// Append data to the buffer without extracting frames.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Bytes the current step needs in total before it can complete.
    pub fn needed(&self) -> usize {
        match self.state {
            State::AwaitingHeader => HEADER_SIZE,
            State::AwaitingPayload { header } => header.payload_len(),
        }
    }

    /// Whether the buffer sits on a frame boundary (no header consumed yet).
    pub fn is_awaiting_header(&self) -> bool {
        matches!(self.state, State::AwaitingHeader)
    }

    /// Header of the frame whose payload is being accumulated, if any.
    pub fn pending_header(&self) -> Option<&FrameHeader> {
        match &self.state {
            State::AwaitingHeader => None,
            State::AwaitingPayload { header } => Some(header),
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
