//! Configuration for the WebSocket transport

use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::types::options::ClientOptions;

/// Connection settings for [`super::WebSocketTransport`]
#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// Full `ws(s)://.../socket.io/?EIO=4&transport=websocket` endpoint
    pub url: Url,
    /// Timeout for each connection attempt
    pub connect_timeout: Duration,
    /// First reconnection delay
    pub reconnect_delay: Duration,
    /// Upper bound for the reconnection delay
    pub reconnect_delay_max: Duration,
}

impl WebSocketConfig {
    /// Derive the transport settings from client options
    ///
    /// # Errors
    /// Returns error if the server URL is malformed
    pub fn from_options(options: &ClientOptions) -> Result<Self> {
        Ok(Self {
            url: options.socket_url()?,
            connect_timeout: options.connect_timeout,
            reconnect_delay: options.reconnect_delay,
            reconnect_delay_max: options.reconnect_delay_max,
        })
    }

    /// Delay before reconnection attempt `attempt` (0-based), doubling up to the max
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        self.reconnect_delay
            .saturating_mul(factor)
            .min(self.reconnect_delay_max)
    }
}
