//! # omt-receiver
//!
//! Receiver for the OMT raw video streaming protocol.
//!
//! A sender (the OMT camera app) pushes length-prefixed frames over TCP:
//! a 36-byte big-endian header starting with the `"OMT0"` marker, followed
//! by the raw frame payload. This crate recovers those frames from the byte
//! stream however the transport happens to split it.
//!
//! ## Architecture
//!
//! - **Protocol**: header codec and the push-based [`protocol::FrameBuffer`]
//! - **Decoder**: pull-based [`FrameDecoder`] over any blocking byte source
//! - **Session**: the loop that feeds decoded frames to a [`sink::FrameSink`]
//! - **Transport**: async connect with timeout, blocking stream afterwards
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::atomic::AtomicBool;
//! use omt_receiver::{config::ReceiverConfig, run_session, sink::WriterSink, transport, FrameDecoder};
//!
//! #[tokio::main]
//! async fn main() -> omt_receiver::Result<()> {
//!     let config = ReceiverConfig::new("192.168.1.20");
//!     let stream = transport::connect(&config).await?;
//!
//!     let mut decoder = FrameDecoder::with_config(stream, config.decoder.clone());
//!     let mut sink = WriterSink::new(std::io::stdout().lock());
//!     let report = run_session(&mut decoder, &mut sink, 100, &AtomicBool::new(false));
//!
//!     eprintln!("Done. Frames received: {}", report.frames);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod decoder;
pub mod error;
pub mod protocol;
pub mod session;
pub mod sink;
pub mod transport;

pub use decoder::{ByteSource, DecoderConfig, FrameDecoder};
pub use error::{DecodeError, ReceiverError, Result};
pub use protocol::{Frame, FrameHeader};
pub use session::{run_session, Outcome, SessionReport};
