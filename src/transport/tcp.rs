//! TCP connect with timeout.
//!
//! # Example
//!
//! ```ignore
//! use omt_receiver::config::ReceiverConfig;
//! use omt_receiver::transport::connect;
//!
//! let stream = connect(&ReceiverConfig::new("192.168.1.20")).await?;
//! ```

use std::net::TcpStream;

use crate::config::ReceiverConfig;
use crate::error::{ReceiverError, Result};

/// Connect to the sender described by `config`.
///
/// Returns a blocking `std::net::TcpStream` with no read timeout; end of
/// stream shows up as a zero-length read.
///
/// # Errors
///
/// - [`ReceiverError::ConnectTimeout`] if the timeout elapses
/// - [`ReceiverError::Connect`] if resolution, connection or socket setup fails
pub async fn connect(config: &ReceiverConfig) -> Result<TcpStream> {
    let addr = config.addr();

    let stream = match tokio::time::timeout(
        config.connect_timeout,
        tokio::net::TcpStream::connect(addr.as_str()),
    )
    .await
    {
        Ok(Ok(stream)) => stream,
        Ok(Err(source)) => return Err(ReceiverError::Connect { addr, source }),
        Err(_) => {
            return Err(ReceiverError::ConnectTimeout {
                addr,
                timeout: config.connect_timeout,
            })
        }
    };

    if let Err(e) = stream.set_nodelay(true) {
        tracing::debug!(error = %e, "could not set TCP_NODELAY");
    }

    let stream = stream
        .into_std()
        .and_then(|stream| stream.set_nonblocking(false).map(|()| stream))
        .map_err(|source| ReceiverError::Connect {
            addr: addr.clone(),
            source,
        })?;

    tracing::debug!(%addr, peer = ?stream.peer_addr().ok(), "connected");
    Ok(stream)
}
