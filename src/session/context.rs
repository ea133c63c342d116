//! Per-session client state
//!
//! [`SessionContext`] is the single owner of everything the client knows
//! about its session. It is mutated only from the client's event path.

use crate::error::{ClientError, Result};
use crate::notify::NotificationCenter;
use crate::progress::ProgressSynchronizer;
use crate::types::identifiers::SessionId;
use crate::types::options::ClientOptions;
use crate::types::uploads::{ProxyKind, UploadCategory, UploadState};
use crate::upload::InputBuffer;

use super::store::PageLocation;

/// State of the persistent channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No usable channel
    #[default]
    Disconnected,
    /// Channel handshake completed
    Connected,
}

/// Job parameters the user picks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    /// Worker threads requested at start
    pub threads: u32,
    /// Connection kind sent with auxiliary uploads
    pub proxy_kind: ProxyKind,
}

/// Everything the client knows about its session
#[derive(Debug)]
pub struct SessionContext {
    session_id: Option<SessionId>,
    connection: ConnectionState,
    location: PageLocation,
    progress: ProgressSynchronizer,
    uploads: UploadState,
    combo_input: InputBuffer,
    proxy_input: InputBuffer,
    config: TransportConfig,
    default_threads: u32,
    notifications: NotificationCenter,
}

impl SessionContext {
    /// Fresh context at `location`
    #[must_use]
    pub fn new(location: PageLocation, options: &ClientOptions) -> Self {
        Self {
            session_id: None,
            connection: ConnectionState::Disconnected,
            location,
            progress: ProgressSynchronizer::new(),
            uploads: UploadState::default(),
            combo_input: InputBuffer::new(UploadCategory::Combo),
            proxy_input: InputBuffer::new(UploadCategory::Proxy),
            config: TransportConfig {
                threads: options.default_threads,
                proxy_kind: ProxyKind::default(),
            },
            default_threads: options.default_threads,
            notifications: NotificationCenter::from_options(options),
        }
    }

    /// Active session id
    #[must_use]
    pub const fn session_id(&self) -> Option<&SessionId> {
        self.session_id.as_ref()
    }

    /// Channel state
    #[must_use]
    pub const fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// True when the channel handshake completed
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// Gate for every outbound command
    ///
    /// # Errors
    /// Returns [`ClientError::NoSession`] without an id and
    /// [`ClientError::NotConnected`] while disconnected
    pub fn require_session(&self) -> Result<&SessionId> {
        let id = self.session_id.as_ref().ok_or(ClientError::NoSession)?;
        if !self.is_connected() {
            return Err(ClientError::NotConnected);
        }
        Ok(id)
    }

    /// Addressable location, rewritten on every session change
    #[must_use]
    pub const fn location(&self) -> &PageLocation {
        &self.location
    }

    /// Progress mirror
    #[must_use]
    pub const fn progress(&self) -> &ProgressSynchronizer {
        &self.progress
    }

    /// Progress mirror, mutable
    pub const fn progress_mut(&mut self) -> &mut ProgressSynchronizer {
        &mut self.progress
    }

    /// Upload artifacts
    #[must_use]
    pub const fn uploads(&self) -> &UploadState {
        &self.uploads
    }

    /// Upload artifacts, mutable
    pub const fn uploads_mut(&mut self) -> &mut UploadState {
        &mut self.uploads
    }

    /// Input buffer for `category`
    #[must_use]
    pub const fn input(&self, category: UploadCategory) -> &InputBuffer {
        match category {
            UploadCategory::Combo => &self.combo_input,
            UploadCategory::Proxy => &self.proxy_input,
        }
    }

    /// Input buffer for `category`, mutable
    pub const fn input_mut(&mut self, category: UploadCategory) -> &mut InputBuffer {
        match category {
            UploadCategory::Combo => &mut self.combo_input,
            UploadCategory::Proxy => &mut self.proxy_input,
        }
    }

    /// Job parameters
    #[must_use]
    pub const fn transport_config(&self) -> TransportConfig {
        self.config
    }

    /// Requested thread count
    #[must_use]
    pub const fn threads(&self) -> u32 {
        self.config.threads
    }

    /// Selected proxy kind
    #[must_use]
    pub const fn proxy_kind(&self) -> ProxyKind {
        self.config.proxy_kind
    }

    /// Select the proxy kind for later auxiliary uploads
    pub const fn set_proxy_kind(&mut self, kind: ProxyKind) {
        self.config.proxy_kind = kind;
    }

    /// Notification queue
    #[must_use]
    pub const fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Notification queue, mutable
    pub const fn notifications_mut(&mut self) -> &mut NotificationCenter {
        &mut self.notifications
    }

    pub(crate) const fn set_connection(&mut self, state: ConnectionState) {
        self.connection = state;
    }

    pub(crate) const fn set_threads(&mut self, threads: u32) {
        self.config.threads = threads;
    }

    pub(crate) const fn default_threads(&self) -> u32 {
        self.default_threads
    }

    /// Adopt `id` wholesale and point the location at it
    pub(crate) fn adopt_session(&mut self, id: SessionId) {
        self.location.set_session_id(&id);
        self.session_id = Some(id);
    }

    /// Forget both datasets and both inputs
    pub(crate) fn clear_uploads(&mut self) {
        self.uploads.clear();
        self.combo_input.clear();
        self.proxy_input.clear();
    }
}
