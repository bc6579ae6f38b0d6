//! Receiver configuration.

use std::time::Duration;

use crate::decoder::DecoderConfig;
use crate::session::DEFAULT_PROGRESS_INTERVAL;

/// Default TCP port of the sender.
pub const DEFAULT_PORT: u16 = 6400;

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything needed to connect to a sender and run a session.
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    /// Sender host name or address.
    pub host: String,
    /// Sender TCP port.
    pub port: u16,
    /// Give up connecting after this long.
    pub connect_timeout: Duration,
    /// Frames between progress log lines (0 disables).
    pub progress_every: u64,
    /// Decoder settings.
    pub decoder: DecoderConfig,
}

impl ReceiverConfig {
    /// Config for `host` with every other setting at its default.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            progress_every: DEFAULT_PROGRESS_INTERVAL,
            decoder: DecoderConfig::default(),
        }
    }

    /// `host:port`, bracketing bare IPv6 addresses.
    pub fn addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReceiverConfig::new("192.168.1.20");
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(DEFAULT_PORT, 6400);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.progress_every, 100);
        assert_eq!(config.decoder.read_chunk_size, 65536);
        assert!(config.decoder.max_payload_size.is_none());
    }

    #[test]
    fn test_addr_formatting() {
        let mut config = ReceiverConfig::new("phone.local");
        config.port = 7000;
        assert_eq!(config.addr(), "phone.local:7000");

        let v6 = ReceiverConfig::new("fe80::1");
        assert_eq!(v6.addr(), "[fe80::1]:6400");

        let bracketed = ReceiverConfig::new("[::1]");
        assert_eq!(bracketed.addr(), "[::1]:6400");
    }
}
