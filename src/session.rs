//! Session driver - the loop between decoder and sink.
//!
//! Pulls frames from a [`FrameDecoder`], hands them to a [`FrameSink`], and
//! logs the stream diagnostics. The loop ends in exactly one [`Outcome`]:
//!
//! ```text
//! source closed on boundary ──► EndOfStream   (success)
//! sink write failed         ──► SinkClosed    (success)
//! cancel flag set           ──► Interrupted   (success)
//! decode error              ──► Failed(err)   (error)
//! ```
//!
//! Cancellation is cooperative: the flag is checked before every decode, so a
//! decode blocked in a read finishes (or fails) before the loop notices. An
//! end of stream or decode error seen after the flag was set is reported as
//! `Interrupted`, since unblocking the read is how the caller cancels.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::decoder::{ByteSource, FrameDecoder};
use crate::error::{DecodeError, EXIT_SUCCESS};
use crate::protocol::FrameHeader;
use crate::sink::FrameSink;

/// Default number of frames between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// How a session ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Sender closed the connection on a frame boundary.
    EndOfStream,
    /// The sink stopped accepting output.
    SinkClosed,
    /// The caller asked the session to stop.
    Interrupted,
    /// Fatal decode error.
    Failed(DecodeError),
}

impl Outcome {
    /// Everything except `Failed` is a normal termination.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    pub fn error(&self) -> Option<&DecodeError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> u8 {
        self.error().map_or(EXIT_SUCCESS, DecodeError::exit_code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EndOfStream => "end_of_stream",
            Self::SinkClosed => "sink_closed",
            Self::Interrupted => "interrupted",
            Self::Failed(_) => "failed",
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcome", 2)?;
        state.serialize_field("status", self.label())?;
        state.serialize_field("error", &self.error().map(|e| e.to_string()))?;
        state.end()
    }
}

/// Summary of a finished session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Frames delivered to the sink.
    pub frames: u64,
    /// Payload bytes delivered to the sink.
    pub payload_bytes: u64,
    /// First header seen, if any.
    pub stream: Option<FrameHeader>,
    pub outcome: Outcome,
}

impl SessionReport {
    /// Serialize as a single JSON line.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Run the decode loop until a terminal outcome.
///
/// `progress_every` of 0 disables the periodic progress line.
pub fn run_session<S, K>(
    decoder: &mut FrameDecoder<S>,
    sink: &mut K,
    progress_every: u64,
    cancel: &AtomicBool,
) -> SessionReport
where
    S: ByteSource,
    K: FrameSink + ?Sized,
{
    let mut frames = 0u64;
    let mut payload_bytes = 0u64;

    let outcome = loop {
        if cancel.load(Ordering::Acquire) {
            break Outcome::Interrupted;
        }

        let frame = match decoder.next_frame() {
            Ok(Some(frame)) => frame,
            _ if cancel.load(Ordering::Acquire) => break Outcome::Interrupted,
            Ok(None) => break Outcome::EndOfStream,
            Err(err) => break Outcome::Failed(err),
        };

        if frames == 0 {
            let h = &frame.header;
            tracing::info!(
                width = h.width,
                height = h.height,
                "Stream: {}x{} strides Y={} U={} V={}",
                h.width,
                h.height,
                h.stride_y,
                h.stride_u,
                h.stride_v
            );
        }

        if let Err(e) = sink.accept(&frame) {
            tracing::debug!(error = %e, "sink closed");
            break Outcome::SinkClosed;
        }

        frames += 1;
        payload_bytes += frame.payload_len() as u64;

        if progress_every > 0 && frames % progress_every == 0 {
            tracing::info!("Frames: {}", frames);
        }
    };

    match &outcome {
        Outcome::Failed(err) => tracing::error!(frames, error = %err, "stream failed"),
        other => tracing::debug!(frames, outcome = other.label(), "session finished"),
    }

    SessionReport {
        frames,
        payload_bytes,
        stream: decoder.first_header().copied(),
        outcome,
    }
}
