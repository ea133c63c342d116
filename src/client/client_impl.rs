//! `SessionClient` implementation
//!
//! This module contains the constructors, the event path and the public
//! command API of `SessionClient`.

use std::path::PathBuf;
use std::sync::Arc;

use futures::Stream;
use tokio::sync::{broadcast, mpsc, watch};

use crate::dispatch::{CommandDispatcher, FsResultsSink, ResultsSink};
use crate::error::{ClientError, Result};
use crate::notify::PendingMessage;
use crate::progress::ProgressView;
use crate::protocol::{OutboundCommand, ServerEvent};
use crate::session::{SessionChannel, SessionContext, SessionStore};
use crate::transport::{
    BulkUploader, HttpBulkUploader, Transport, TransportEvent, WebSocketTransport,
};
use crate::types::identifiers::SessionId;
use crate::types::options::ClientOptions;
use crate::types::uploads::{ProxyKind, UploadCategory};
use crate::upload::{Route, TransportSelector, UploadSource};

use super::{ClientEvent, SessionClient, UploadOutcome};

/// Source of the next step on the event path
enum Next {
    Transport(Option<Result<TransportEvent>>),
    Upload(UploadOutcome),
}

impl SessionClient<WebSocketTransport, HttpBulkUploader, FsResultsSink> {
    /// Create a client talking to the configured backend
    ///
    /// The session id is persisted under `state_dir` and results are saved
    /// into `download_dir`.
    ///
    /// # Errors
    /// Returns error if a configured URL is malformed
    pub fn from_options(options: ClientOptions) -> Result<Self> {
        let transport = WebSocketTransport::from_options(&options)?;
        let uploader = HttpBulkUploader::from_options(&options)?;
        let sink = FsResultsSink::from_options(&options);
        let store = SessionStore::from_options(&options);
        Self::new(transport, uploader, sink, store, &options)
    }
}

impl<T, U, S> SessionClient<T, U, S>
where
    T: Transport,
    U: BulkUploader,
    S: ResultsSink,
{
    /// Create a client from its parts
    ///
    /// # Arguments
    /// * `transport` - Persistent event channel
    /// * `uploader` - Bulk-upload transport
    /// * `sink` - Destination for delivered results
    /// * `store` - Session id persistence
    /// * `options` - Client configuration
    ///
    /// # Errors
    /// Returns error if the page location is malformed
    pub fn new(
        transport: T,
        uploader: U,
        sink: S,
        store: SessionStore,
        options: &ClientOptions,
    ) -> Result<Self> {
        let ctx = SessionContext::new(options.page_location()?, options);
        let (upload_tx, upload_rx) = mpsc::unbounded_channel();

        Ok(Self {
            transport,
            events: None,
            uploader: Arc::new(uploader),
            upload_tx,
            upload_rx,
            uploads_in_flight: 0,
            channel: SessionChannel::new(ctx, store),
            dispatcher: CommandDispatcher::new(sink),
        })
    }

    /// Open the persistent channel
    ///
    /// The session handshake runs once the channel reports itself connected,
    /// on the next call to [`Self::next_event`].
    ///
    /// # Errors
    /// Returns error if the transport cannot connect
    pub async fn connect(&mut self) -> Result<()> {
        if self.events.is_some() {
            return Ok(());
        }
        self.transport.connect().await?;
        self.events = Some(self.transport.read_events());
        Ok(())
    }

    /// Process the next channel event or upload completion
    ///
    /// This is the only place session state changes in response to the
    /// backend. Uploads still running when the channel closes are drained
    /// first; returns `None` once the channel is closed and no upload is
    /// outstanding.
    pub async fn next_event(&mut self) -> Option<Result<ClientEvent>> {
        loop {
            let next = match self.events.as_mut() {
                Some(events) => tokio::select! {
                    incoming = events.recv() => Next::Transport(incoming),
                    Some(outcome) = self.upload_rx.recv() => Next::Upload(outcome),
                },
                None if self.uploads_in_flight > 0 => Next::Upload(self.upload_rx.recv().await?),
                None => return None,
            };

            return match next {
                Next::Transport(Some(Ok(event))) => Some(self.apply_transport_event(event).await),
                Next::Transport(Some(Err(e))) => {
                    log::warn!("Channel error: {e}");
                    Some(Err(e))
                }
                Next::Transport(None) => {
                    log::info!("Event channel closed");
                    self.events = None;
                    continue;
                }
                Next::Upload(outcome) => Some(Ok(self.apply_upload_outcome(outcome))),
            };
        }
    }

    /// Consume the client as a stream of [`ClientEvent`]s
    pub fn into_stream(mut self) -> impl Stream<Item = Result<ClientEvent>> {
        async_stream::stream! {
            while let Some(event) = self.next_event().await {
                yield event;
            }
        }
    }

    async fn apply_transport_event(&mut self, event: TransportEvent) -> Result<ClientEvent> {
        match event {
            TransportEvent::Connected => {
                let handshake = self.channel.on_connected();
                self.transport.send(&handshake).await?;
                Ok(ClientEvent::Connected)
            }
            TransportEvent::Disconnected => {
                self.channel.on_disconnected();
                Ok(ClientEvent::Disconnected)
            }
            TransportEvent::Event(event) => self.apply_server_event(event).await,
        }
    }

    async fn apply_server_event(&mut self, event: ServerEvent) -> Result<ClientEvent> {
        let Some(delivery) = self.channel.handle_event(event.clone()) else {
            return Ok(ClientEvent::Server(event));
        };

        let pushed = delivery.pushed;
        let path = self
            .dispatcher
            .deliver_results(self.channel.context_mut(), delivery)
            .await?;
        Ok(ClientEvent::ResultsSaved { path, pushed })
    }

    fn apply_upload_outcome(&mut self, outcome: UploadOutcome) -> ClientEvent {
        self.uploads_in_flight = self.uploads_in_flight.saturating_sub(1);
        let UploadOutcome { category, result } = outcome;
        match result {
            Ok(ack) => {
                log::info!("{category} upload success: {}", ack.message);
                ClientEvent::UploadAccepted {
                    category,
                    message: ack.message,
                }
            }
            Err(error) => {
                let text = match &error {
                    ClientError::Connection(_) | ClientError::Timeout(_) => format!(
                        "Network error during {category} upload. Please check server connection."
                    ),
                    ClientError::UploadRejected { message } => {
                        format!("Error uploading {category}: {message}")
                    }
                    other => format!("Error uploading {category}: {other}"),
                };
                log::error!("Error uploading {category}: {error}");

                let ctx = self.channel.context_mut();
                ctx.input_mut(category).clear();
                ctx.notifications_mut().error(text);
                ClientEvent::UploadFailed { category, error }
            }
        }
    }

    // ------------------------------------------------------------------
    // Uploads
    // ------------------------------------------------------------------

    /// Replace the input for `category` with typed text
    pub fn set_input(&mut self, category: UploadCategory, text: impl Into<String>) {
        self.channel.context_mut().input_mut(category).set_text(text);
    }

    /// Append a pasted chunk to the input for `category`
    ///
    /// # Errors
    /// Returns [`ClientError::PasteTooLarge`] when the chunk is over the inline
    /// ceiling; the input is cleared and an error notification raised
    pub fn paste(&mut self, category: UploadCategory, text: &str) -> Result<()> {
        let ctx = self.channel.context_mut();
        if let Err(e) = ctx.input_mut(category).paste(text) {
            ctx.notifications_mut().error(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    /// Submit the pasted text for `category` over the channel
    ///
    /// # Errors
    /// Returns the session gate error, [`ClientError::EmptyInput`] when there
    /// is no pasted text (offer a file instead), [`ClientError::PasteTooLarge`]
    /// over the ceiling, or the transport error
    pub async fn submit_input(&mut self, category: UploadCategory) -> Result<()> {
        let text = self
            .channel
            .context()
            .input(category)
            .draft()
            .unwrap_or_default()
            .to_string();

        let command = match self.route(category, UploadSource::Pasted(text))? {
            Route::Inline(command) => command,
            Route::Bulk(_) => {
                return Err(ClientError::protocol("pasted input routed to bulk upload"));
            }
        };

        self.send(&command).await?;
        self.channel
            .context_mut()
            .notifications_mut()
            .info(format!("Processing pasted {category} content..."));
        Ok(())
    }

    /// Upload a file for `category` over the bulk-upload transport
    ///
    /// The upload runs in the background; its completion arrives through
    /// [`Self::next_event`].
    ///
    /// # Errors
    /// Returns the session gate error
    pub fn submit_file(&mut self, category: UploadCategory, path: impl Into<PathBuf>) -> Result<()> {
        let request = match self.route(category, UploadSource::File(path.into()))? {
            Route::Bulk(request) => request,
            Route::Inline(_) => {
                return Err(ClientError::protocol("file routed inline"));
            }
        };

        Self::spawn_bulk_upload(Arc::clone(&self.uploader), request, self.upload_tx.clone());
        self.uploads_in_flight += 1;
        self.channel
            .context_mut()
            .notifications_mut()
            .info(format!("Uploading {category} file..."));
        Ok(())
    }

    fn route(&mut self, category: UploadCategory, source: UploadSource) -> Result<Route> {
        let ctx = self.channel.context_mut();
        match TransportSelector::route(ctx, category, source) {
            Ok(route) => Ok(route),
            Err(e @ ClientError::EmptyInput(_)) => Err(e),
            Err(e) => {
                if matches!(e, ClientError::PasteTooLarge { .. }) {
                    ctx.input_mut(category).clear();
                }
                ctx.notifications_mut().error(e.to_string());
                Err(e)
            }
        }
    }

    /// Select the proxy kind sent with auxiliary uploads
    pub fn set_proxy_kind(&mut self, kind: ProxyKind) {
        self.channel.context_mut().set_proxy_kind(kind);
    }

    // ------------------------------------------------------------------
    // Job control
    // ------------------------------------------------------------------

    /// Start the job with the thread count typed by the user
    ///
    /// # Errors
    /// Returns the gate error, [`ClientError::InvalidThreadCount`], or the
    /// transport error
    pub async fn start(&mut self, threads_input: &str) -> Result<()> {
        let command = self
            .dispatcher
            .start(self.channel.context_mut(), threads_input)?;
        self.send(&command).await
    }

    /// Stop the job
    ///
    /// # Errors
    /// Returns the gate error or the transport error
    pub async fn stop(&mut self) -> Result<()> {
        let command = self.dispatcher.stop(self.channel.context_mut())?;
        self.send(&command).await
    }

    /// Pause the job
    ///
    /// # Errors
    /// Returns the gate error or the transport error
    pub async fn pause(&mut self) -> Result<()> {
        let command = self.dispatcher.pause(self.channel.context_mut())?;
        self.send(&command).await
    }

    /// Resume a paused job
    ///
    /// # Errors
    /// Returns the gate error or the transport error
    pub async fn resume(&mut self) -> Result<()> {
        let command = self.dispatcher.resume(self.channel.context_mut())?;
        self.send(&command).await
    }

    /// Ask the backend for the current results
    ///
    /// # Errors
    /// Returns the gate error or the transport error
    pub async fn request_results(&mut self) -> Result<()> {
        let command = self.dispatcher.request_results(self.channel.context_mut())?;
        self.send(&command).await
    }

    async fn send(&mut self, command: &OutboundCommand) -> Result<()> {
        if let Err(e) = self.transport.send(command).await {
            log::error!("Failed to send '{}': {e}", command.event_name());
            self.channel
                .context_mut()
                .notifications_mut()
                .error(e.to_string());
            return Err(e);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // State access
    // ------------------------------------------------------------------

    /// Session state
    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        self.channel.context()
    }

    /// Active session id
    #[must_use]
    pub fn session_id(&self) -> Option<&SessionId> {
        self.context().session_id()
    }

    /// Render-ready progress view
    #[must_use]
    pub fn progress_view(&self) -> ProgressView {
        self.context().progress().view()
    }

    /// Watch every progress view published from now on
    #[must_use]
    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressView> {
        self.context().progress().subscribe()
    }

    /// Receive every notification raised from now on
    #[must_use]
    pub fn subscribe_notifications(&self) -> broadcast::Receiver<PendingMessage> {
        self.context().notifications().subscribe()
    }

    /// Drop notifications past their exit window
    pub fn retire_notifications(&mut self) -> usize {
        self.channel
            .context_mut()
            .notifications_mut()
            .retire_expired(tokio::time::Instant::now())
    }

    /// Persistent channel
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Close the client and clean up resources
    ///
    /// # Errors
    /// Returns error if cleanup fails
    pub async fn close(&mut self) -> Result<()> {
        self.events = None;
        self.transport.close().await
    }
}
