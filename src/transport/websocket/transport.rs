//! WebSocket transport implementation for the persistent event channel

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::SinkExt;
use futures::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::Transport;
use crate::error::{ClientError, Result};
use crate::protocol::OutboundCommand;
use crate::types::options::ClientOptions;

use super::super::TransportEvent;
use super::config::WebSocketConfig;

pub(super) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
pub(super) type WsWriter = SplitSink<WsStream, Message>;
pub(super) type WsReader = SplitStream<WsStream>;

/// WebSocket transport speaking Socket.IO to the backend
///
/// The transport reconnects on its own after a drop and reports each
/// successful namespace connect as [`TransportEvent::Connected`].
pub struct WebSocketTransport {
    pub(super) config: WebSocketConfig,
    pub(super) writer: Arc<Mutex<Option<WsWriter>>>,
    pub(super) reader: Option<WsReader>,
    pub(super) ready: Arc<AtomicBool>,
    pub(super) closing: Arc<AtomicBool>,
    pub(super) reader_task: Option<JoinHandle<()>>,
}

impl WebSocketTransport {
    /// Create a new WebSocket transport
    ///
    /// # Arguments
    /// * `config` - Endpoint and reconnection settings
    #[must_use]
    pub fn new(config: WebSocketConfig) -> Self {
        Self {
            config,
            writer: Arc::new(Mutex::new(None)),
            reader: None,
            ready: Arc::new(AtomicBool::new(false)),
            closing: Arc::new(AtomicBool::new(false)),
            reader_task: None,
        }
    }

    /// Create a transport from client options
    ///
    /// # Errors
    /// Returns error if the server URL is malformed
    pub fn from_options(options: &ClientOptions) -> Result<Self> {
        Ok(Self::new(WebSocketConfig::from_options(options)?))
    }

    /// Endpoint this transport connects to
    #[must_use]
    pub fn url(&self) -> &str {
        self.config.url.as_str()
    }
}

impl Transport for WebSocketTransport {
    async fn connect(&mut self) -> Result<()> {
        self.connect_impl().await
    }

    async fn send(&mut self, command: &OutboundCommand) -> Result<()> {
        if !self.is_ready() {
            return Err(ClientError::transport("Transport is not ready for writing"));
        }

        let frame = command.to_frame()?;
        let mut writer_guard = self.writer.lock().await;
        let writer = writer_guard
            .as_mut()
            .ok_or_else(|| ClientError::transport("socket writer not available"))?;

        writer
            .send(Message::Text(frame.into()))
            .await
            .map_err(|e| ClientError::transport(format!("Failed to send frame: {e}")))?;

        log::debug!("Sent '{}'", command.event_name());
        Ok(())
    }

    fn read_events(&mut self) -> mpsc::UnboundedReceiver<Result<TransportEvent>> {
        self.read_events_impl()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    async fn close(&mut self) -> Result<()> {
        self.close_impl().await
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.closing.store(true, Ordering::SeqCst);
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
    }
}
