//! Frame sinks - where decoded frames go.
//!
//! A sink receives frames in emission order. Its failures are not decoder
//! defects: the session treats any sink error as the consumer going away.

use std::io::{self, Write};

use crate::protocol::Frame;

/// Consumer of decoded frames.
pub trait FrameSink {
    /// Accept one frame.
    fn accept(&mut self, frame: &Frame) -> io::Result<()>;
}

/// Writes raw payload bytes to any `Write`, flushing after every frame.
///
/// With stdout as the writer this produces a raw NV12 stream that can be
/// piped straight into a player.
pub struct WriterSink<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Total payload bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for WriterSink<W> {
    fn accept(&mut self, frame: &Frame) -> io::Result<()> {
        self.writer.write_all(frame.payload())?;
        self.writer.flush()?;
        self.bytes_written += frame.payload_len() as u64;
        Ok(())
    }
}

/// Collects frames in memory.
impl FrameSink for Vec<Frame> {
    fn accept(&mut self, frame: &Frame) -> io::Result<()> {
        self.push(frame.clone());
        Ok(())
    }
}

impl<T: FrameSink + ?Sized> FrameSink for &mut T {
    fn accept(&mut self, frame: &Frame) -> io::Result<()> {
        (**self).accept(frame)
    }
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn accept(&mut self, frame: &Frame) -> io::Result<()> {
        (**self).accept(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::FrameHeader;

    fn frame(payload: &'static [u8]) -> Frame {
        Frame::new(
            FrameHeader::new(1, 1, [1, 1, 1], 0, payload.len() as u32),
            bytes::Bytes::from_static(payload),
        )
    }

    #[test]
    fn test_writer_sink_concatenates_payloads() {
        let mut sink = WriterSink::new(Vec::new());
        sink.accept(&frame(b"abc")).unwrap();
        sink.accept(&frame(b"")).unwrap();
        sink.accept(&frame(b"de")).unwrap();

        assert_eq!(sink.bytes_written(), 5);
        assert_eq!(sink.into_inner(), b"abcde");
    }

    #[test]
    fn test_writer_sink_propagates_write_errors() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut sink = WriterSink::new(Closed);
        let err = sink.accept(&frame(b"x")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(sink.bytes_written(), 0);
    }

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut frames: Vec<Frame> = Vec::new();
        {
            let sink: &mut dyn FrameSink = &mut frames;
            sink.accept(&frame(b"1")).unwrap();
            sink.accept(&frame(b"2")).unwrap();
        }
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].payload(), b"2");
    }
}
