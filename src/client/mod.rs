//! `SessionClient` for driving a backend job
//!
//! This module wires the session components together:
//! - the persistent event channel ([`Transport`])
//! - the bulk-upload path ([`BulkUploader`])
//! - session identity, progress mirror and notifications ([`SessionChannel`])
//! - gated job control and results delivery ([`CommandDispatcher`])
//!
//! # Architecture
//!
//! All session state is mutated from one place, [`SessionClient::next_event`]:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                      SessionClient                         │
//! │                                                            │
//! │  ┌──────────────────┐          ┌──────────────────┐       │
//! │  │  Channel Reader  │          │  Bulk Uploads    │       │
//! │  │  (transport task)│          │  (spawned tasks) │       │
//! │  │                  │          │                  │       │
//! │  │ • Heartbeats     │          │ • One per file   │       │
//! │  │ • Reconnects     │          │ • Never blocks   │       │
//! │  │ • Never touches  │          │   control        │       │
//! │  │   session state  │          │                  │       │
//! │  └────────┬─────────┘          └────────┬─────────┘       │
//! │           │ mpsc                   mpsc │                  │
//! │           │      ┌──────────────┐       │                  │
//! │           └─────→│  next_event  │←──────┘                  │
//! │                  │ (&mut self)  │                          │
//! │                  └──────────────┘                          │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example: Basic Usage
//!
//! ```no_run
//! use jobsync_client::{ClientEvent, ClientOptions, SessionClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ClientOptions::builder()
//!     .server_url("http://localhost:5000/crun")
//!     .build();
//! let mut client = SessionClient::from_options(options)?;
//! client.connect().await?;
//!
//! while let Some(event) = client.next_event().await {
//!     match event? {
//!         ClientEvent::Connected => log::info!("Channel up"),
//!         ClientEvent::Server(event) => log::info!("Backend sent {}", event.name()),
//!         ClientEvent::ResultsSaved { path, .. } => {
//!             log::info!("Results at {}", path.display());
//!         }
//!         _ => {}
//!     }
//! }
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Uploading and Starting
//!
//! ```no_run
//! use jobsync_client::{ClientOptions, SessionClient, UploadCategory};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = SessionClient::from_options(ClientOptions::default())?;
//! client.connect().await?;
//!
//! // Wait for the handshake to assign a session
//! while client.context().session_id().is_none() {
//!     if client.next_event().await.is_none() {
//!         return Ok(());
//!     }
//! }
//!
//! // Small lists can be pasted, large ones go as files
//! client.paste(UploadCategory::Proxy, "10.0.0.1:8080\n10.0.0.2:8080")?;
//! client.submit_input(UploadCategory::Proxy).await?;
//! client.submit_file(UploadCategory::Combo, "records.txt")?;
//!
//! client.start("25").await?;
//! # Ok(())
//! # }
//! ```

mod client_impl;
mod tasks;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dispatch::{CommandDispatcher, FsResultsSink};
use crate::error::{ClientError, Result};
use crate::protocol::ServerEvent;
use crate::session::SessionChannel;
use crate::transport::{BulkUploader, Transport, TransportEvent};
use crate::types::uploads::UploadCategory;

pub(crate) use tasks::UploadOutcome;

/// What one step of [`SessionClient::next_event`] did
#[derive(Debug)]
pub enum ClientEvent {
    /// Channel came up and the session handshake was sent
    Connected,
    /// Channel dropped; the transport reconnects on its own
    Disconnected,
    /// Backend event applied to the session state
    Server(ServerEvent),
    /// Results file delivered and saved
    ResultsSaved {
        /// Where the file was written
        path: PathBuf,
        /// True for an unsolicited push
        pushed: bool,
    },
    /// Bulk upload accepted; ingestion is confirmed later over the channel
    UploadAccepted {
        /// Uploaded dataset
        category: UploadCategory,
        /// Backend message
        message: String,
    },
    /// Bulk upload failed and the input was cleared
    UploadFailed {
        /// Dataset that failed
        category: UploadCategory,
        /// Failure
        error: ClientError,
    },
}

/// Client for one backend job session
///
/// `SessionClient` owns the session state and is the only place it changes.
/// Commands are gated locally, uploads are routed by size and source, and
/// the progress mirror follows every backend snapshot.
///
/// # Examples
///
/// ```no_run
/// use jobsync_client::{ClientOptions, SessionClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut client = SessionClient::from_options(ClientOptions::default())?;
///     client.connect().await?;
///
///     let mut progress = client.subscribe_progress();
///     tokio::spawn(async move {
///         while progress.changed().await.is_ok() {
///             let view = progress.borrow().clone();
///             log::info!("{}: {}/{}", view.status, view.checked, view.total_lines);
///         }
///     });
///
///     while let Some(event) = client.next_event().await {
///         log::debug!("{:?}", event?);
///     }
///
///     Ok(())
/// }
/// ```
pub struct SessionClient<T, U, S = FsResultsSink>
where
    T: Transport,
    U: BulkUploader,
{
    /// Persistent event channel
    transport: T,
    /// Channel events, present once connected
    events: Option<mpsc::UnboundedReceiver<Result<TransportEvent>>>,
    /// Bulk-upload transport shared with upload tasks
    uploader: Arc<U>,
    /// Upload completion sender handed to upload tasks
    upload_tx: mpsc::UnboundedSender<UploadOutcome>,
    /// Upload completions
    upload_rx: mpsc::UnboundedReceiver<UploadOutcome>,
    /// Spawned uploads whose outcome has not been applied yet
    uploads_in_flight: usize,
    /// Session state and event application
    channel: SessionChannel,
    /// Gated control commands and results delivery
    dispatcher: CommandDispatcher<S>,
}
