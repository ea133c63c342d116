//! # Job Session Client for Rust
//!
//! A client library for driving a long-running backend job (a "checker
//! job") over a persistent event channel. It covers three concerns:
//!
//! - **Identity** - how the client names its session across reconnects
//! - **Bulk input** - which transport carries datasets of widely varying size
//! - **Progress** - keeping a live view consistent with backend state
//!   through start, pause, resume, stop and complete
//!
//! ## Quick Start
//!
//! ```no_run
//! use jobsync_client::{ClientEvent, ClientOptions, SessionClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ClientOptions::builder()
//!         .server_url("http://localhost:5000/crun")
//!         .build();
//!
//!     let mut client = SessionClient::from_options(options)?;
//!     client.connect().await?;
//!
//!     while let Some(event) = client.next_event().await {
//!         if let ClientEvent::Server(event) = event? {
//!             log::info!("{}", event.name());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Features
//!
//! ### 1. Session Identity
//!
//! The backend mints a session id on first contact. The client persists it
//! (see [`session::store`]) and mirrors it into its page location as
//! `?session=<id>`, so a shared link restores the same job. A reconnect
//! presents the stored id and hydrates the local view from the backend's
//! remembered state.
//!
//! ### 2. Dual-Transport Upload
//!
//! Pasted text under a per-category ceiling rides the event channel inline;
//! files go through a one-shot multipart upload regardless of size:
//!
//! ```no_run
//! # use jobsync_client::{ClientOptions, SessionClient, UploadCategory};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let mut client = SessionClient::from_options(ClientOptions::default())?;
//! client.paste(UploadCategory::Combo, "alpha:1\nbeta:2")?;
//! client.submit_input(UploadCategory::Combo).await?;
//!
//! client.submit_file(UploadCategory::Proxy, "endpoints.txt")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### 3. Progress Mirror
//!
//! Every backend snapshot replaces the local one. Renderers subscribe:
//!
//! ```no_run
//! # use jobsync_client::{ClientOptions, SessionClient};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = SessionClient::from_options(ClientOptions::default())?;
//! let mut progress = client.subscribe_progress();
//! while progress.changed().await.is_ok() {
//!     let view = progress.borrow().clone();
//!     log::info!("{:?} {} hits", view.indicator, view.hits);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`types`]: Core type definitions, newtypes, and builders
//! - [`client`]: The session client and its event path
//! - [`session`]: Session identity, state and event application
//! - [`upload`]: Transport selection and input buffers
//! - [`progress`]: Job status mirror
//! - [`dispatch`]: Gated job control and results delivery
//! - [`notify`]: Transient user-facing notifications
//! - [`protocol`]: Wire framing and event vocabulary
//! - [`transport`]: WebSocket channel and HTTP bulk upload
//! - [`error`]: Error types and handling
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T, ClientError>`](Result). Local
//! refusals (no session, not connected, bad thread count, oversized paste)
//! never reach the network:
//!
//! ```no_run
//! # use jobsync_client::{ClientError, ClientOptions, SessionClient};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let mut client = SessionClient::from_options(ClientOptions::default())?;
//! match client.start("250").await {
//!     Ok(()) => {}
//!     Err(ClientError::InvalidThreadCount(input)) => {
//!         log::warn!("Rejected thread count {input}");
//!     }
//!     Err(e) => log::error!("Error: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod dispatch;
pub mod error;
pub mod notify;
pub mod progress;
pub mod protocol;
pub mod session;
pub mod transport;
pub mod types;
pub mod upload;

// Re-export commonly used types for external API
pub use client::{ClientEvent, SessionClient};
pub use dispatch::{CommandDispatcher, FsResultsSink, ResultsDelivery, ResultsSink};
pub use error::{ClientError, Result};
pub use notify::{NotificationCenter, PendingMessage, Severity};
pub use progress::{ProgressSynchronizer, ProgressView, StatusIndicator};
pub use protocol::{OutboundCommand, ServerEvent};
pub use session::{
    ConnectionState, FileStorage, MemoryStorage, PageLocation, SessionChannel, SessionContext,
    SessionStorage, SessionStore,
};
pub use transport::{
    BulkUploadRequest, BulkUploader, HttpBulkUploader, Transport, TransportEvent, UploadAck,
    WebSocketTransport,
};
pub use upload::{InputBuffer, Route, TransportSelector, UploadSource};

// Re-export type submodules for flat public API
pub use types::identifiers::SessionId;
pub use types::options::{ClientOptions, ClientOptionsBuilder};
pub use types::stats::{ElapsedTime, JobStatus};
pub use types::uploads::{ProxyKind, UploadArtifact, UploadCategory, UploadState};

/// Version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
