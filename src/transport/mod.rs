//! Transport module - TCP connection to the sender.
//!
//! Connecting is async (tokio, with a timeout); the resulting socket is
//! handed back in blocking mode so it can serve as a
//! [`ByteSource`](crate::decoder::ByteSource).

mod tcp;

pub use tcp::connect;
