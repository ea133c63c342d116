//! Error types for the job session client

use thiserror::Error;

use crate::types::uploads::UploadCategory;

/// Main error type for the job session client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection error when talking to the backend
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transport layer error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Wire protocol error (malformed frame, unexpected packet)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON decode error when parsing a payload
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// Event payload did not match the expected shape
    #[error("Event parse error: {message}")]
    EventParse {
        /// Error message
        message: String,
        /// Raw payload that failed to parse
        data: Option<serde_json::Value>,
    },

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed URL in configuration
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No active session id; the command was not sent
    #[error("No active session. Please refresh the page or wait for connection.")]
    NoSession,

    /// Channel is disconnected; the command was not sent
    #[error("Not connected to server. Please check your connection.")]
    NotConnected,

    /// Thread count input outside 1..=100 or not a number
    #[error("Please enter a valid thread count (1-100)!")]
    InvalidThreadCount(String),

    /// Pasted content exceeds the inline ceiling for its category
    #[error(
        "Pasted {category} content is too large ({lines} lines). Please use the file upload dialog for files larger than {limit} lines."
    )]
    PasteTooLarge {
        /// Category of the rejected paste
        category: UploadCategory,
        /// Counted lines
        lines: usize,
        /// Ceiling for the category
        limit: usize,
    },

    /// Submit with nothing pasted; the caller should offer a file instead
    #[error("Nothing to upload for {0}. Choose a file instead.")]
    EmptyInput(UploadCategory),

    /// Bulk upload answered with a failure status
    #[error("{message}")]
    UploadRejected {
        /// Backend-authored message
        message: String,
    },

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a protocol error
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Create an event parse error
    pub fn event_parse(msg: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self::EventParse {
            message: msg.into(),
            data,
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid thread count error
    pub fn invalid_thread_count(input: impl Into<String>) -> Self {
        Self::InvalidThreadCount(input.into())
    }

    /// Create a paste-too-large error
    #[must_use]
    pub const fn paste_too_large(category: UploadCategory, lines: usize, limit: usize) -> Self {
        Self::PasteTooLarge {
            category,
            lines,
            limit,
        }
    }

    /// Create an empty input error
    #[must_use]
    pub const fn empty_input(category: UploadCategory) -> Self {
        Self::EmptyInput(category)
    }

    /// Create an upload rejected error
    pub fn upload_rejected(msg: impl Into<String>) -> Self {
        Self::UploadRejected {
            message: msg.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// True for failures detected locally that never reached the network
    #[must_use]
    pub const fn is_local_validation(&self) -> bool {
        matches!(
            self,
            Self::NoSession
                | Self::NotConnected
                | Self::InvalidThreadCount(_)
                | Self::PasteTooLarge { .. }
                | Self::EmptyInput(_)
        )
    }
}
