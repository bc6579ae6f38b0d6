//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the binary protocol spoken by the sender:
//! - 36-byte header encoding/decoding
//! - Frame buffer for accumulating partial reads
//! - Frame struct with typed accessors

mod frame;
mod frame_buffer;
mod wire_format;

pub use frame::{build_frame, Frame};
pub use frame_buffer::{FrameBuffer, DEFAULT_BUFFER_CAPACITY};
pub use wire_format::{FrameHeader, HEADER_SIZE, MARKER};
