//! Pull-based frame decoder.
//!
//! [`FrameDecoder`] drives a [`FrameBuffer`] from a blocking [`ByteSource`]
//! and turns the byte stream into a sequence of validated [`Frame`]s. It
//! reads only when the buffer cannot satisfy the current step, and it ends in
//! one of two terminal states:
//!
//! - `Finished`: the source closed exactly on a frame boundary
//! - `Failed`: bad marker, oversized payload, truncated stream or read error
//!
//! Once terminal, every call returns the same result.
//!
//! # Example
//!
//! ```
//! use omt_receiver::decoder::FrameDecoder;
//! use omt_receiver::protocol::{build_frame, FrameHeader};
//!
//! let mut bytes = build_frame(&FrameHeader::new(2, 2, [2, 1, 1], 1, 6), b"YYYYUV");
//! bytes.extend(build_frame(&FrameHeader::new(2, 2, [2, 1, 1], 2, 0), b""));
//!
//! let mut decoder = FrameDecoder::new(std::io::Cursor::new(bytes));
//! assert_eq!(decoder.next_frame().unwrap().unwrap().payload(), b"YYYYUV");
//! assert!(decoder.next_frame().unwrap().unwrap().payload().is_empty());
//! assert!(decoder.next_frame().unwrap().is_none());
//! ```

use std::io::{self, Read};

use crate::error::DecodeError;
use crate::protocol::{Frame, FrameBuffer, FrameHeader, DEFAULT_BUFFER_CAPACITY};

/// Default maximum bytes requested from the source per read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 64 * 1024;

/// A blocking source of bytes.
///
/// `read_chunk` reads up to `buf.len()` bytes, blocking until at least one
/// byte is available. `Ok(0)` means the stream has ended.
pub trait ByteSource {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl<R: Read + ?Sized> ByteSource for R {
    #[inline]
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Configuration for a [`FrameDecoder`].
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    /// Maximum bytes requested from the source per read.
    pub read_chunk_size: usize,
    /// Initial capacity of the accumulation buffer.
    pub initial_capacity: usize,
    /// Reject headers announcing more payload than this.
    pub max_payload_size: Option<u32>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            initial_capacity: DEFAULT_BUFFER_CAPACITY,
            max_payload_size: None,
        }
    }
}

/// Observable decoder phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingHeader,
    AwaitingPayload,
    Finished,
    Failed,
}

#[derive(Debug)]
enum Status {
    Running,
    Finished,
    Failed(DecodeError),
}

/// Decodes frames from a blocking byte source.
///
/// Not meant to be driven from more than one thread at a time; it holds no
/// locks and does no work between calls.
pub struct FrameDecoder<S> {
    source: S,
    buffer: FrameBuffer,
    /// Read target, copied into `buffer` after each read.
    scratch: Vec<u8>,
    status: Status,
    first_header: Option<FrameHeader>,
    frames_decoded: u64,
    /// Set once the iterator has yielded the terminal error.
    error_yielded: bool,
}

impl<S: ByteSource> FrameDecoder<S> {
    /// Create a decoder with default settings.
    pub fn new(source: S) -> Self {
        Self::with_config(source, DecoderConfig::default())
    }

    /// Create a decoder with custom settings.
    pub fn with_config(source: S, config: DecoderConfig) -> Self {
        Self {
            source,
            buffer: FrameBuffer::with_capacity_and_max_payload(
                config.initial_capacity,
                config.max_payload_size,
            ),
            scratch: vec![0u8; config.read_chunk_size.max(1)],
            status: Status::Running,
            first_header: None,
            frames_decoded: 0,
            error_yielded: false,
        }
    }

    /// Decode the next frame.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` for each complete frame
    /// - `Ok(None)` once the source closed on a frame boundary
    /// - `Err(...)` on a fatal error; no partial frame is ever returned
    pub fn next_frame(&mut self) -> Result<Option<Frame>, DecodeError> {
        match &self.status {
            Status::Finished => return Ok(None),
            Status::Failed(err) => return Err(err.clone()),
            Status::Running => {}
        }

        match self.advance() {
            Ok(Some(frame)) => {
                if self.first_header.is_none() {
                    self.first_header = Some(frame.header);
                }
                self.frames_decoded += 1;
                Ok(Some(frame))
            }
            Ok(None) => {
                tracing::debug!(frames = self.frames_decoded, "stream ended on frame boundary");
                self.status = Status::Finished;
                Ok(None)
            }
            Err(err) => {
                tracing::debug!(frames = self.frames_decoded, error = %err, "frame decoding failed");
                self.status = Status::Failed(err.clone());
                Err(err)
            }
        }
    }

    fn advance(&mut self) -> Result<Option<Frame>, DecodeError> {
        loop {
            if let Some(frame) = self.buffer.try_extract()? {
                return Ok(Some(frame));
            }

            if self.fill()? == 0 {
                if self.buffer.is_awaiting_header() && self.buffer.is_empty() {
                    return Ok(None);
                }
                return Err(DecodeError::Truncated {
                    needed: self.buffer.needed(),
                    buffered: self.buffer.len(),
                });
            }
        }
    }

    /// Read once from the source into the buffer. Returns bytes read.
    fn fill(&mut self) -> Result<usize, DecodeError> {
        loop {
            match self.source.read_chunk(&mut self.scratch) {
                Ok(n) => {
                    self.buffer.extend(&self.scratch[..n]);
                    tracing::trace!(read = n, buffered = self.buffer.len(), "source read");
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<S> FrameDecoder<S> {
    /// Header of the first decoded frame, for one-time stream diagnostics.
    pub fn first_header(&self) -> Option<&FrameHeader> {
        self.first_header.as_ref()
    }

    /// Number of frames returned so far.
    pub fn frames_decoded(&self) -> u64 {
        self.frames_decoded
    }

    /// Bytes buffered but not yet consumed.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn phase(&self) -> Phase {
        match self.status {
            Status::Finished => Phase::Finished,
            Status::Failed(_) => Phase::Failed,
            Status::Running if self.buffer.is_awaiting_header() => Phase::AwaitingHeader,
            Status::Running => Phase::AwaitingPayload,
        }
    }

    /// Whether the decoder reached `Finished` or `Failed`.
    pub fn is_terminated(&self) -> bool {
        !matches!(self.status, Status::Running)
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Give back the source. Buffered bytes are dropped.
    pub fn into_inner(self) -> S {
        self.source
    }
}

/// Yields each frame, then the terminal error once if there is one.
impl<S: ByteSource> Iterator for FrameDecoder<S> {
    type Item = Result<Frame, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.error_yielded {
            return None;
        }
        match self.next_frame() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => None,
            Err(err) => {
                self.error_yielded = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_frame, HEADER_SIZE};
    use std::io::Cursor;

    fn frame_bytes(timestamp: u64, payload: &[u8]) -> Vec<u8> {
        build_frame(
            &FrameHeader::new(16, 8, [16, 8, 8], timestamp, payload.len() as u32),
            payload,
        )
    }

    /// Serves fixed-size chunks and counts reads.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        step: usize,
        reads: usize,
    }

    impl Trickle {
        fn new(data: Vec<u8>, step: usize) -> Self {
            Self {
                data,
                pos: 0,
                step,
                reads: 0,
            }
        }
    }

    impl ByteSource for Trickle {
        fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.reads += 1;
            let n = self.step.min(buf.len()).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Fails with the given kind on the first read, then serves `data`.
    struct Flaky {
        kind: Option<io::ErrorKind>,
        data: Cursor<Vec<u8>>,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.kind.take() {
                Some(kind) => Err(io::Error::new(kind, "flaky source")),
                None => self.data.read(buf),
            }
        }
    }

    #[test]
    fn test_empty_stream_is_clean_end() {
        let mut decoder = FrameDecoder::new(Cursor::new(Vec::new()));
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.phase(), Phase::Finished);
        assert_eq!(decoder.frames_decoded(), 0);
    }

    #[test]
    fn test_decodes_frames_in_order() {
        let mut data = frame_bytes(1, b"one");
        data.extend(frame_bytes(2, b"two!"));

        let mut decoder = FrameDecoder::new(Cursor::new(data));
        let first = decoder.next_frame().unwrap().unwrap();
        let second = decoder.next_frame().unwrap().unwrap();

        assert_eq!((first.timestamp(), first.payload()), (1, &b"one"[..]));
        assert_eq!((second.timestamp(), second.payload()), (2, &b"two!"[..]));
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.frames_decoded(), 2);
    }

    #[test]
    fn test_reads_only_when_buffer_is_short() {
        // Whole stream fits in one read; the second frame must not trigger another.
        let mut data = frame_bytes(1, b"a");
        data.extend(frame_bytes(2, b"b"));
        let len = data.len();

        let mut decoder = FrameDecoder::new(Trickle::new(data, len));
        decoder.next_frame().unwrap().unwrap();
        decoder.next_frame().unwrap().unwrap();
        assert_eq!(decoder.get_ref().reads, 1);

        // Only now does the decoder need to ask, and sees end of stream.
        assert!(decoder.next_frame().unwrap().is_none());
        assert_eq!(decoder.get_ref().reads, 2);
    }

    #[test]
    fn test_one_byte_reads() {
        let payload: Vec<u8> = (0..=255).collect();
        let data = frame_bytes(5, &payload);

        let mut decoder = FrameDecoder::new(Trickle::new(data, 1));
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.payload(), &payload[..]);
        assert!(decoder.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_small_read_chunks_span_header_and_payload() {
        let data = frame_bytes(1, b"0123456789");
        let config = DecoderConfig {
            read_chunk_size: HEADER_SIZE + 4,
            ..DecoderConfig::default()
        };
        let mut decoder = FrameDecoder::with_config(Trickle::new(data, usize::MAX), config);
        assert_eq!(decoder.phase(), Phase::AwaitingHeader);

        // 40 bytes, then the remaining 6 of the payload
        let frame = decoder.next_frame().unwrap().unwrap();
        assert_eq!(frame.payload(), b"0123456789");
        assert_eq!(decoder.phase(), Phase::AwaitingHeader);
        assert_eq!(decoder.get_ref().reads, 2);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn test_truncated_header() {
        let data = frame_bytes(1, b"payload");
        let mut decoder = FrameDecoder::new(Cursor::new(data[..20].to_vec()));

        let err = decoder.next_frame().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Truncated {
                needed: HEADER_SIZE,
                buffered: 20
            }
        ));
        assert_eq!(decoder.phase(), Phase::Failed);
    }

    #[test]
    fn test_truncated_payload_emits_nothing() {
        let data = frame_bytes(1, b"0123456789");
        let mut decoder = FrameDecoder::new(Cursor::new(data[..HEADER_SIZE + 3].to_vec()));

        let err = decoder.next_frame().unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Truncated {
                needed: 10,
                buffered: 3
            }
        ));
        assert_eq!(decoder.frames_decoded(), 0);
    }

    #[test]
    fn test_header_only_with_nonzero_length_is_truncated() {
        let data = frame_bytes(1, b"xyz");
        let mut decoder = FrameDecoder::new(Cursor::new(data[..HEADER_SIZE].to_vec()));
        assert!(matches!(
            decoder.next_frame(),
            Err(DecodeError::Truncated { buffered: 0, .. })
        ));
    }

    #[test]
    fn test_bad_marker_is_fatal() {
        let mut data = frame_bytes(1, b"abc");
        data[3] = b'1';

        let mut decoder = FrameDecoder::new(Cursor::new(data));
        assert!(matches!(
            decoder.next_frame(),
            Err(DecodeError::BadMarker { found: 0x4F4D_5431 })
        ));
        assert!(decoder.first_header().is_none());
    }

    #[test]
    fn test_terminal_results_are_idempotent() {
        let mut finished = FrameDecoder::new(Cursor::new(frame_bytes(1, b"")));
        finished.next_frame().unwrap().unwrap();
        for _ in 0..3 {
            assert!(finished.next_frame().unwrap().is_none());
        }

        let mut failed = FrameDecoder::new(Cursor::new(vec![0u8; HEADER_SIZE]));
        for _ in 0..3 {
            assert!(matches!(
                failed.next_frame(),
                Err(DecodeError::BadMarker { found: 0 })
            ));
        }
        assert!(failed.is_terminated());
    }

    #[test]
    fn test_read_error_is_fatal() {
        let source = Flaky {
            kind: Some(io::ErrorKind::ConnectionReset),
            data: Cursor::new(frame_bytes(1, b"never seen")),
        };
        let mut decoder = FrameDecoder::new(source);

        let err = decoder.next_frame().unwrap_err();
        assert!(matches!(err, DecodeError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
        // Stays failed even though the source would now deliver data
        assert!(matches!(decoder.next_frame(), Err(DecodeError::Io(_))));
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let source = Flaky {
            kind: Some(io::ErrorKind::Interrupted),
            data: Cursor::new(frame_bytes(1, b"ok")),
        };
        let mut decoder = FrameDecoder::new(source);
        assert_eq!(decoder.next_frame().unwrap().unwrap().payload(), b"ok");
    }

    #[test]
    fn test_first_header_is_kept_across_dimension_changes() {
        let mut data = build_frame(&FrameHeader::new(640, 480, [640, 320, 320], 1, 1), b"a");
        data.extend(build_frame(
            &FrameHeader::new(1280, 720, [1344, 672, 672], 2, 1),
            b"b",
        ));

        let mut decoder = FrameDecoder::new(Cursor::new(data));
        let first = decoder.next_frame().unwrap().unwrap();
        let second = decoder.next_frame().unwrap().unwrap();

        assert_eq!(first.width(), 640);
        assert_eq!(second.width(), 1280);
        assert_eq!(decoder.first_header().map(|h| h.strides()), Some([640, 320, 320]));
    }

    #[test]
    fn test_max_payload_config() {
        let config = DecoderConfig {
            max_payload_size: Some(2),
            ..DecoderConfig::default()
        };
        let mut decoder = FrameDecoder::with_config(Cursor::new(frame_bytes(1, b"abc")), config);
        assert!(matches!(
            decoder.next_frame(),
            Err(DecodeError::PayloadTooLarge { length: 3, max: 2 })
        ));
    }

    #[test]
    fn test_iterator_yields_error_once() {
        let mut data = frame_bytes(1, b"x");
        data.extend_from_slice(&[0xEE; 7]);

        let items: Vec<_> = FrameDecoder::new(Cursor::new(data)).collect();
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(DecodeError::Truncated { .. })));
    }

    #[test]
    fn test_iterator_stops_on_clean_end() {
        let mut data = frame_bytes(1, b"x");
        data.extend(frame_bytes(2, b"y"));

        let payloads: Vec<_> = FrameDecoder::new(Cursor::new(data))
            .map(|f| f.unwrap().into_payload())
            .collect();
        assert_eq!(payloads, vec![&b"x"[..], &b"y"[..]]);
    }
}
