//! Transport configuration.

use std::time::Duration;

use natter_core::SessionConfig;

/// How long a send waits for the socket to become writable before the line
/// is dropped.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(100);

/// Bytes requested from the socket per read. Longer lines are split.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Client transport configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Session settings: announcement and keepalive period.
    pub session: SessionConfig,
    /// Writability wait per outbound line.
    pub send_timeout: Duration,
    /// Read size per socket read.
    pub read_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}
