//! Inbound events received over the persistent channel

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::types::identifiers::SessionId;
use crate::types::stats::JobStatus;
use crate::types::uploads::ProxyKind;

/// Session state the backend remembers for a reconnecting client
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreviousState {
    /// Job status at reconnect time
    pub stats: JobStatus,
    /// Backend still holds a primary list
    #[serde(default)]
    pub combo_file_uploaded: bool,
    /// Backend still holds an auxiliary list
    #[serde(default)]
    pub proxy_file_uploaded: bool,
    /// Thread count of the last run
    #[serde(default)]
    pub threads: Option<u32>,
    /// Connection kind of the auxiliary list
    #[serde(default)]
    pub proxy_type: Option<ProxyKind>,
    /// Coarse run state (`stopped`, `running`, `paused`)
    #[serde(default)]
    pub checker_status: Option<String>,
}

/// Confirmation that a dataset was ingested
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadConfirmation {
    /// Lines the backend accepted
    pub count: u64,
    /// Backend-authored message
    #[serde(default)]
    pub message: String,
    /// Server-confirmed connection kind (auxiliary list only)
    #[serde(default)]
    pub proxy_type: Option<ProxyKind>,
    /// Older backends send the kind as `type`, some send both
    #[serde(default, rename = "type")]
    legacy_type: Option<ProxyKind>,
}

impl UploadConfirmation {
    /// Confirmation for `count` accepted lines
    pub fn new(count: u64, message: impl Into<String>) -> Self {
        Self {
            count,
            message: message.into(),
            proxy_type: None,
            legacy_type: None,
        }
    }

    /// Attach the server-confirmed connection kind
    #[must_use]
    pub const fn with_proxy_type(mut self, kind: ProxyKind) -> Self {
        self.proxy_type = Some(kind);
        self
    }

    /// Connection kind the backend confirmed, from either field
    #[must_use]
    pub const fn confirmed_kind(&self) -> Option<ProxyKind> {
        match self.proxy_type {
            Some(kind) => Some(kind),
            None => self.legacy_type,
        }
    }
}

/// Results file pushed or returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultsPayload {
    /// File content
    pub content: String,
    /// Suggested file name
    pub filename: String,
}

/// Event from backend to client
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Fresh session minted
    SessionCreated {
        /// New session id
        session_id: SessionId,
    },
    /// Stored session acknowledged
    SessionReconnected {
        /// Restored session id
        session_id: SessionId,
        /// Remembered state, when the backend has any
        previous_state: Option<PreviousState>,
    },
    /// Periodic job status snapshot
    StatsUpdate(JobStatus),
    /// Primary list ingested
    ComboUploaded(UploadConfirmation),
    /// Auxiliary list ingested
    ProxyUploaded(UploadConfirmation),
    /// Job started
    CheckerStarted {
        /// Backend-authored message
        message: String,
    },
    /// Job stopped
    CheckerStopped {
        /// Backend-authored message
        message: String,
    },
    /// Job paused
    CheckerPaused {
        /// Backend-authored message
        message: String,
    },
    /// Job resumed
    CheckerContinued {
        /// Backend-authored message
        message: String,
    },
    /// Job finished every line
    CheckerCompleted {
        /// Backend-authored message
        message: String,
    },
    /// Unsolicited results-ready push
    HitsAvailable(ResultsPayload),
    /// Results in response to an explicit request
    HitsDownload(ResultsPayload),
    /// Generic backend failure
    Error {
        /// Backend-authored message
        message: String,
    },
    /// Event name this client does not handle
    Unknown {
        /// Event name
        name: String,
        /// Raw payload
        data: Option<Value>,
    },
}

impl ServerEvent {
    /// Wire name of the event
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::SessionCreated { .. } => "session_created",
            Self::SessionReconnected { .. } => "session_reconnected",
            Self::StatsUpdate(_) => "stats_update",
            Self::ComboUploaded(_) => "combo_uploaded",
            Self::ProxyUploaded(_) => "proxy_uploaded",
            Self::CheckerStarted { .. } => "checker_started",
            Self::CheckerStopped { .. } => "checker_stopped",
            Self::CheckerPaused { .. } => "checker_paused",
            Self::CheckerContinued { .. } => "checker_continued",
            Self::CheckerCompleted { .. } => "checker_completed",
            Self::HitsAvailable(_) => "hits_available",
            Self::HitsDownload(_) => "hits_download",
            Self::Error { .. } => "error",
            Self::Unknown { name, .. } => name,
        }
    }
}

#[derive(Deserialize)]
struct SessionPayload {
    session_id: SessionId,
    #[serde(default)]
    previous_state: Option<PreviousState>,
}

#[derive(Deserialize)]
struct MessagePayload {
    #[serde(default)]
    message: String,
}

/// Parse a named Socket.IO event into a typed [`ServerEvent`]
///
/// # Arguments
/// * `name` - Event name
/// * `data` - First event argument, if any
///
/// # Errors
/// Returns `ClientError::EventParse` if a known event carries a payload of the
/// wrong shape
pub fn parse_event(name: &str, data: Option<Value>) -> Result<ServerEvent> {
    let event = match name {
        "session_created" => {
            let payload: SessionPayload = decode(name, data)?;
            ServerEvent::SessionCreated {
                session_id: payload.session_id,
            }
        }
        "session_reconnected" => {
            let payload: SessionPayload = decode(name, data)?;
            ServerEvent::SessionReconnected {
                session_id: payload.session_id,
                previous_state: payload.previous_state,
            }
        }
        "stats_update" => ServerEvent::StatsUpdate(decode(name, data)?),
        "combo_uploaded" => ServerEvent::ComboUploaded(decode(name, data)?),
        "proxy_uploaded" => ServerEvent::ProxyUploaded(decode(name, data)?),
        "checker_started" => ServerEvent::CheckerStarted {
            message: decode::<MessagePayload>(name, data)?.message,
        },
        "checker_stopped" => ServerEvent::CheckerStopped {
            message: decode::<MessagePayload>(name, data)?.message,
        },
        "checker_paused" => ServerEvent::CheckerPaused {
            message: decode::<MessagePayload>(name, data)?.message,
        },
        "checker_continued" => ServerEvent::CheckerContinued {
            message: decode::<MessagePayload>(name, data)?.message,
        },
        "checker_completed" => ServerEvent::CheckerCompleted {
            message: decode::<MessagePayload>(name, data)?.message,
        },
        "hits_available" => ServerEvent::HitsAvailable(decode(name, data)?),
        "hits_download" => ServerEvent::HitsDownload(decode(name, data)?),
        "error" => ServerEvent::Error {
            message: decode::<MessagePayload>(name, data)?.message,
        },
        other => ServerEvent::Unknown {
            name: other.to_string(),
            data,
        },
    };
    Ok(event)
}

fn decode<T: serde::de::DeserializeOwned>(name: &str, data: Option<Value>) -> Result<T> {
    let data = data.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    serde_json::from_value(data.clone()).map_err(|e| {
        ClientError::event_parse(format!("Failed to parse '{name}' event: {e}"), Some(data))
    })
}
