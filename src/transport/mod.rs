//! Transport layer for communicating with the backend
//!
//! This module provides the two transports a session uses:
//!
//! - [`Transport`]: the persistent bidirectional event channel, implemented
//!   over a WebSocket by [`WebSocketTransport`]
//! - [`BulkUploader`]: the one-shot request/response upload path for files
//!   of any size, implemented over HTTP by [`HttpBulkUploader`]

pub mod bulk;
pub mod websocket;

use tokio::sync::mpsc;

use crate::error::Result;
use crate::protocol::{OutboundCommand, ServerEvent};

/// Something that happened on the persistent channel
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Channel became usable (first connect or native reconnect)
    Connected,
    /// Channel dropped; the transport may reconnect on its own
    Disconnected,
    /// Application event from the backend
    Event(ServerEvent),
}

/// Transport trait for the persistent event channel
///
/// This trait defines the interface for sending commands to and receiving
/// events from the backend.
pub trait Transport: Send + Sync {
    /// Connect to the transport
    ///
    /// # Errors
    /// Returns error if connection fails
    fn connect(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Send one command
    ///
    /// # Arguments
    /// * `command` - Command to emit on the channel
    ///
    /// # Errors
    /// Returns error if write fails or transport is not ready
    fn send(
        &mut self,
        command: &OutboundCommand,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Read events from the transport
    ///
    /// Returns a receiver that yields channel events. This method spawns a
    /// background task to read frames, allowing concurrent writes. The receiver
    /// is closed when the transport is closed.
    fn read_events(&mut self) -> mpsc::UnboundedReceiver<Result<TransportEvent>>;

    /// Check if transport is ready for communication
    fn is_ready(&self) -> bool;

    /// Close the transport and clean up resources
    ///
    /// # Errors
    /// Returns error if cleanup fails
    fn close(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub use bulk::{BulkUploadRequest, BulkUploader, HttpBulkUploader, UploadAck};
pub use websocket::WebSocketTransport;
