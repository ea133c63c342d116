//! Session handshake and inbound event application
//!
//! [`SessionChannel`] turns channel lifecycle changes and backend events
//! into mutations of the [`SessionContext`]. It never performs I/O itself:
//! the handshake command it returns is sent by the caller, and results it
//! receives are handed back as a [`ResultsDelivery`].

use crate::dispatch::ResultsDelivery;
use crate::protocol::{OutboundCommand, PreviousState, ServerEvent, UploadConfirmation};
use crate::types::identifiers::SessionId;
use crate::types::options::THREADS_RANGE;
use crate::types::uploads::{UploadArtifact, UploadCategory};

use super::context::{ConnectionState, SessionContext};
use super::store::SessionStore;

/// Applies channel lifecycle and backend events to the session state
#[derive(Debug)]
pub struct SessionChannel {
    ctx: SessionContext,
    store: SessionStore,
}

impl SessionChannel {
    /// Create a channel over a context and its store
    #[must_use]
    pub fn new(ctx: SessionContext, store: SessionStore) -> Self {
        Self { ctx, store }
    }

    /// Session state
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Session state, mutable
    pub const fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.ctx
    }

    /// Channel became usable
    ///
    /// Returns the handshake to send: restore the known session if there is
    /// one, otherwise ask for a new one.
    pub fn on_connected(&mut self) -> OutboundCommand {
        self.ctx.set_connection(ConnectionState::Connected);
        self.ctx
            .notifications_mut()
            .success("Connected to server successfully!");

        let known = self
            .ctx
            .session_id()
            .cloned()
            .or_else(|| self.store.load(self.ctx.location()));

        match known {
            Some(session_id) => {
                log::info!("Restoring session {session_id}");
                OutboundCommand::ReconnectSession { session_id }
            }
            None => {
                log::info!("Requesting a new session");
                OutboundCommand::RequestSession
            }
        }
    }

    /// Channel dropped; everything but the connection flag is kept
    pub fn on_disconnected(&mut self) {
        self.ctx.set_connection(ConnectionState::Disconnected);
        self.ctx.notifications_mut().error("Disconnected from server!");
    }

    /// Apply one backend event
    ///
    /// Returns the results payload when the event carries one.
    pub fn handle_event(&mut self, event: ServerEvent) -> Option<ResultsDelivery> {
        log::debug!("Applying '{}'", event.name());

        match event {
            ServerEvent::SessionCreated { session_id } => self.on_session_created(session_id),
            ServerEvent::SessionReconnected {
                session_id,
                previous_state,
            } => self.on_session_reconnected(session_id, previous_state),
            ServerEvent::StatsUpdate(stats) => self.ctx.progress_mut().apply(stats),
            ServerEvent::ComboUploaded(confirmation) => {
                self.on_uploaded(UploadCategory::Combo, confirmation);
            }
            ServerEvent::ProxyUploaded(confirmation) => {
                self.on_uploaded(UploadCategory::Proxy, confirmation);
            }
            ServerEvent::CheckerStarted { message }
            | ServerEvent::CheckerContinued { message }
            | ServerEvent::CheckerCompleted { message } => {
                self.ctx.notifications_mut().success(message);
            }
            ServerEvent::CheckerStopped { message } | ServerEvent::CheckerPaused { message } => {
                self.ctx.notifications_mut().info(message);
            }
            ServerEvent::HitsAvailable(payload) => return Some(ResultsDelivery::pushed(payload)),
            ServerEvent::HitsDownload(payload) => return Some(ResultsDelivery::requested(payload)),
            ServerEvent::Error { message } => {
                log::warn!("Backend error: {message}");
                self.ctx.notifications_mut().error(message);
            }
            ServerEvent::Unknown { name, .. } => {
                log::debug!("Ignoring unhandled event '{name}'");
            }
        }
        None
    }

    fn on_session_created(&mut self, session_id: SessionId) {
        log::info!("Session created: {session_id}");
        self.store.save(&session_id);
        self.ctx.adopt_session(session_id);
        self.ctx.progress_mut().reset();
        self.ctx.clear_uploads();
        self.ctx
            .notifications_mut()
            .success("Session created successfully!");
    }

    fn on_session_reconnected(
        &mut self,
        session_id: SessionId,
        previous_state: Option<PreviousState>,
    ) {
        log::info!("Session reconnected: {session_id}");
        self.store.save(&session_id);
        self.ctx.adopt_session(session_id);
        self.ctx
            .notifications_mut()
            .success("Session reconnected successfully!");

        let Some(previous) = previous_state else {
            return;
        };

        let combo_lines = previous.stats.total_lines;
        let proxy_kind = previous.proxy_type.unwrap_or_default();
        let threads = previous
            .threads
            .filter(|n| THREADS_RANGE.contains(n))
            .unwrap_or_else(|| self.ctx.default_threads());

        self.ctx.progress_mut().hydrate(previous.stats);
        self.ctx.set_threads(threads);
        self.ctx.set_proxy_kind(proxy_kind);

        if previous.combo_file_uploaded {
            self.ctx.uploads_mut().replace(UploadArtifact::uploaded(
                UploadCategory::Combo,
                Some(combo_lines),
                None,
            ));
            self.ctx
                .input_mut(UploadCategory::Combo)
                .mark_uploaded(Some(combo_lines));
        } else {
            self.ctx
                .uploads_mut()
                .replace(UploadArtifact::empty(UploadCategory::Combo));
            self.ctx.input_mut(UploadCategory::Combo).clear();
        }

        if previous.proxy_file_uploaded {
            self.ctx.uploads_mut().replace(UploadArtifact::uploaded(
                UploadCategory::Proxy,
                None,
                Some(proxy_kind),
            ));
            self.ctx.input_mut(UploadCategory::Proxy).mark_uploaded(None);
        } else {
            self.ctx
                .uploads_mut()
                .replace(UploadArtifact::empty(UploadCategory::Proxy));
            self.ctx.input_mut(UploadCategory::Proxy).clear();
        }
    }

    fn on_uploaded(&mut self, category: UploadCategory, confirmation: UploadConfirmation) {
        let kind = match category {
            UploadCategory::Combo => None,
            UploadCategory::Proxy => {
                let kind = confirmation
                    .confirmed_kind()
                    .unwrap_or_else(|| self.ctx.proxy_kind());
                self.ctx.set_proxy_kind(kind);
                Some(kind)
            }
        };

        if category == UploadCategory::Combo {
            self.ctx.progress_mut().set_total_lines(confirmation.count);
        }

        self.ctx.uploads_mut().replace(UploadArtifact::uploaded(
            category,
            Some(confirmation.count),
            kind,
        ));
        self.ctx
            .input_mut(category)
            .mark_uploaded(Some(confirmation.count));
        self.ctx.notifications_mut().success(confirmation.message);
    }
}
