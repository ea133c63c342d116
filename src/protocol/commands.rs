//! Outbound commands sent over the persistent channel

use serde_json::{Value, json};

use crate::error::Result;
use crate::types::identifiers::SessionId;
use crate::types::uploads::{ProxyKind, UploadCategory};

use super::codec::SocketPacket;

/// Command from client to backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    /// Ask for a brand-new session
    RequestSession,
    /// Resume a previously stored session
    ReconnectSession {
        /// Stored session id
        session_id: SessionId,
    },
    /// Inline primary-list submission
    UploadCombo {
        /// Active session id
        session_id: SessionId,
        /// Full pasted text
        content: String,
    },
    /// Inline auxiliary-list submission
    UploadProxy {
        /// Active session id
        session_id: SessionId,
        /// Full pasted text
        content: String,
        /// Selected connection kind
        proxy_type: ProxyKind,
    },
    /// Begin or resume processing
    StartChecker {
        /// Active session id
        session_id: SessionId,
        /// Worker thread count, 1..=100
        threads: u32,
    },
    /// Halt processing
    StopChecker {
        /// Active session id
        session_id: SessionId,
    },
    /// Suspend processing
    PauseChecker {
        /// Active session id
        session_id: SessionId,
    },
    /// Resume from pause
    ContinueChecker {
        /// Active session id
        session_id: SessionId,
    },
    /// Request the current results payload
    DownloadHits {
        /// Active session id
        session_id: SessionId,
    },
}

impl OutboundCommand {
    /// Inline upload command for a category
    #[must_use]
    pub fn inline_upload(
        category: UploadCategory,
        session_id: SessionId,
        content: String,
        proxy_type: ProxyKind,
    ) -> Self {
        match category {
            UploadCategory::Combo => Self::UploadCombo {
                session_id,
                content,
            },
            UploadCategory::Proxy => Self::UploadProxy {
                session_id,
                content,
                proxy_type,
            },
        }
    }

    /// Event name on the wire
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::RequestSession => "request_session",
            Self::ReconnectSession { .. } => "reconnect_session",
            Self::UploadCombo { .. } => "upload_combo",
            Self::UploadProxy { .. } => "upload_proxy",
            Self::StartChecker { .. } => "start_checker",
            Self::StopChecker { .. } => "stop_checker",
            Self::PauseChecker { .. } => "pause_checker",
            Self::ContinueChecker { .. } => "continue_checker",
            Self::DownloadHits { .. } => "download_hits",
        }
    }

    /// Session id carried by the command, if any
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        match self {
            Self::RequestSession => None,
            Self::ReconnectSession { session_id }
            | Self::UploadCombo { session_id, .. }
            | Self::UploadProxy { session_id, .. }
            | Self::StartChecker { session_id, .. }
            | Self::StopChecker { session_id }
            | Self::PauseChecker { session_id }
            | Self::ContinueChecker { session_id }
            | Self::DownloadHits { session_id } => Some(session_id),
        }
    }

    /// Event payload; `request_session` carries none
    #[must_use]
    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::RequestSession => None,
            Self::UploadCombo {
                session_id,
                content,
            } => Some(json!({ "session_id": session_id, "content": content })),
            Self::UploadProxy {
                session_id,
                content,
                proxy_type,
            } => Some(json!({
                "session_id": session_id,
                "content": content,
                "proxy_type": proxy_type,
            })),
            Self::StartChecker {
                session_id,
                threads,
            } => Some(json!({ "session_id": session_id, "threads": threads })),
            Self::ReconnectSession { session_id }
            | Self::StopChecker { session_id }
            | Self::PauseChecker { session_id }
            | Self::ContinueChecker { session_id }
            | Self::DownloadHits { session_id } => Some(json!({ "session_id": session_id })),
        }
    }

    /// Socket.IO event packet for this command
    #[must_use]
    pub fn to_packet(&self) -> SocketPacket {
        SocketPacket::Event {
            name: self.event_name().to_string(),
            data: self.payload(),
        }
    }

    /// WebSocket text frame for this command
    ///
    /// # Errors
    /// Returns error if the payload cannot be serialized
    pub fn to_frame(&self) -> Result<String> {
        self.to_packet().to_frame()
    }
}
