//! Client options and configuration
//!
//! This module contains the configuration options for the job session client,
//! including a builder pattern for easy configuration.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};
use crate::session::store::PageLocation;

/// Default backend address
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1/";

/// Default thread count offered to the user
pub const DEFAULT_THREADS: u32 = 10;

/// Inclusive bounds for the thread count
pub const THREADS_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

// ============================================================================
// Client Options
// ============================================================================

/// Main options for the job session client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Backend base URL (http or https)
    pub server_url: String,
    /// Page location the session id is reflected into; defaults to `server_url`
    pub page_url: Option<String>,
    /// Path of the persistent event channel endpoint
    pub socket_path: String,
    /// Path of the bulk-upload endpoint, resolved against `server_url`
    pub upload_path: String,
    /// Directory holding the durable session record
    pub state_dir: PathBuf,
    /// Directory results are saved into
    pub download_dir: PathBuf,
    /// Timeout for establishing the WebSocket
    pub connect_timeout: Duration,
    /// First reconnection delay
    pub reconnect_delay: Duration,
    /// Upper bound for the reconnection delay
    pub reconnect_delay_max: Duration,
    /// Thread count used until the user or the backend sets one
    pub default_threads: u32,
    /// How long a notification stays fully visible
    pub display_window: Duration,
    /// Exit animation window after the display window
    pub exit_window: Duration,
}

impl ClientOptions {
    /// Create a new builder for `ClientOptions`
    #[must_use]
    pub fn builder() -> ClientOptionsBuilder {
        ClientOptionsBuilder::default()
    }

    /// WebSocket endpoint of the event channel
    ///
    /// # Errors
    /// Returns error if `server_url` is malformed or not http(s)/ws(s)
    pub fn socket_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.server_url)?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(ClientError::invalid_config(format!(
                    "server_url must use http(s) or ws(s), got: {other}"
                )));
            }
        };
        url.set_scheme(scheme)
            .map_err(|()| ClientError::invalid_config("cannot switch server_url to a ws scheme"))?;
        url.set_path(&format!("/{}/", self.socket_path.trim_matches('/')));
        url.query_pairs_mut()
            .clear()
            .append_pair("EIO", "4")
            .append_pair("transport", "websocket");
        url.set_fragment(None);
        Ok(url)
    }

    /// HTTP endpoint of the bulk-upload transport
    ///
    /// # Errors
    /// Returns error if `server_url` or `upload_path` is malformed
    pub fn upload_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.server_url)?.join(&self.upload_path)?)
    }

    /// Initial page location, carrying `?session=` when a shared link was given
    ///
    /// # Errors
    /// Returns error if the configured URL is malformed
    pub fn page_location(&self) -> Result<PageLocation> {
        let raw = self.page_url.as_deref().unwrap_or(&self.server_url);
        Ok(PageLocation::new(Url::parse(raw)?))
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            page_url: None,
            socket_path: "socket.io".to_string(),
            upload_path: "/upload_file".to_string(),
            state_dir: PathBuf::from(".jobsync"),
            download_dir: PathBuf::from("."),
            connect_timeout: Duration::from_secs(10),
            reconnect_delay: Duration::from_secs(1),
            reconnect_delay_max: Duration::from_secs(5),
            default_threads: DEFAULT_THREADS,
            display_window: Duration::from_secs(5),
            exit_window: Duration::from_millis(300),
        }
    }
}

// ============================================================================
// Builder for ClientOptions
// ============================================================================

/// Builder for `ClientOptions`
#[derive(Debug, Default)]
pub struct ClientOptionsBuilder {
    options: ClientOptions,
}

impl ClientOptionsBuilder {
    /// Set backend base URL
    #[must_use]
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.options.server_url = url.into();
        self
    }

    /// Set the page location (e.g. a shared `?session=` link)
    #[must_use]
    pub fn page_url(mut self, url: impl Into<String>) -> Self {
        self.options.page_url = Some(url.into());
        self
    }

    /// Set event channel path
    #[must_use]
    pub fn socket_path(mut self, path: impl Into<String>) -> Self {
        self.options.socket_path = path.into();
        self
    }

    /// Set bulk-upload path
    #[must_use]
    pub fn upload_path(mut self, path: impl Into<String>) -> Self {
        self.options.upload_path = path.into();
        self
    }

    /// Set session state directory
    #[must_use]
    pub fn state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.state_dir = dir.into();
        self
    }

    /// Set results download directory
    #[must_use]
    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.download_dir = dir.into();
        self
    }

    /// Set WebSocket connect timeout
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.options.connect_timeout = timeout;
        self
    }

    /// Set reconnection backoff bounds
    #[must_use]
    pub const fn reconnect_delay(mut self, initial: Duration, max: Duration) -> Self {
        self.options.reconnect_delay = initial;
        self.options.reconnect_delay_max = max;
        self
    }

    /// Set default thread count
    ///
    /// # Panics
    /// Panics if threads is outside 1..=100
    #[must_use]
    pub fn default_threads(mut self, threads: u32) -> Self {
        assert!(
            THREADS_RANGE.contains(&threads),
            "default_threads {threads} outside allowed range {}..={}",
            THREADS_RANGE.start(),
            THREADS_RANGE.end()
        );
        self.options.default_threads = threads;
        self
    }

    /// Set notification display and exit windows
    #[must_use]
    pub const fn notification_windows(mut self, display: Duration, exit: Duration) -> Self {
        self.options.display_window = display;
        self.options.exit_window = exit;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> ClientOptions {
        self.options
    }
}
