//! Error types for omt-receiver.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Process exit status: clean end, closed output or interrupted.
pub const EXIT_SUCCESS: u8 = 0;
/// Bad command line or unusable output file.
pub const EXIT_USAGE: u8 = 1;
/// Connection refused, unreachable or timed out.
pub const EXIT_CONNECT: u8 = 2;
/// Bad marker or oversized payload.
pub const EXIT_PROTOCOL: u8 = 3;
/// Stream closed inside a header or payload.
pub const EXIT_TRUNCATED: u8 = 4;
/// Read error or other I/O failure.
pub const EXIT_IO: u8 = 5;

/// Fatal conditions raised while decoding the frame stream.
///
/// Cloneable so a terminated decoder can hand back the same error on every
/// subsequent call.
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// The header did not start with the protocol marker. The stream offset
    /// can no longer be trusted.
    #[error("Bad marker 0x{found:08X} (expected 0x{expected:08X})", expected = crate::protocol::MARKER)]
    BadMarker { found: u32 },

    /// Header announced a payload above the configured limit.
    #[error("Payload size {length} exceeds maximum {max}")]
    PayloadTooLarge { length: u32, max: u32 },

    /// Stream closed in the middle of a header or payload.
    #[error("Stream truncated: needed {needed} bytes, {buffered} buffered")]
    Truncated { needed: usize, buffered: usize },

    /// The byte source failed.
    #[error("Read error: {0}")]
    Io(#[source] Arc<std::io::Error>),
}

impl DecodeError {
    /// Whether this is a framing violation (as opposed to truncation or I/O).
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::BadMarker { .. } | Self::PayloadTooLarge { .. })
    }

    /// Process exit status for a session that failed with this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::BadMarker { .. } | Self::PayloadTooLarge { .. } => EXIT_PROTOCOL,
            Self::Truncated { .. } => EXIT_TRUNCATED,
            Self::Io(_) => EXIT_IO,
        }
    }
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

/// Main error type for receiver operations.
#[derive(Debug, Error)]
pub enum ReceiverError {
    /// Transport could not be established.
    #[error("Connect to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport was not established within the timeout.
    #[error("Connect to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: String, timeout: Duration },

    /// Fatal decode error.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// I/O error outside the decode path (socket setup, output files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (session reports).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReceiverError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Connect { .. } | Self::ConnectTimeout { .. } => EXIT_CONNECT,
            Self::Decode(err) => err.exit_code(),
            Self::Io(_) | Self::Json(_) => EXIT_IO,
        }
    }
}

/// Result type alias using ReceiverError.
pub type Result<T> = std::result::Result<T, ReceiverError>;
