//! Lifecycle management for the WebSocket transport (connect, close)

use std::sync::atomic::Ordering;

use futures::{SinkExt, StreamExt};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{ClientError, Result};
use crate::protocol::SocketPacket;

use super::config::WebSocketConfig;
use super::transport::{WebSocketTransport, WsStream};

/// Install the process-wide rustls provider used by `wss://` connections
///
/// Returns false when another provider was installed first, which is fine.
pub(super) fn install_crypto_provider() -> bool {
    rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok()
}

/// Open one WebSocket to the configured endpoint
pub(super) async fn open_socket(config: &WebSocketConfig) -> Result<WsStream> {
    if config.url.scheme() == "wss" && install_crypto_provider() {
        log::debug!("Installed ring crypto provider for TLS");
    }
    let (stream, _response) = timeout(config.connect_timeout, connect_async(config.url.as_str()))
        .await
        .map_err(|_| {
            ClientError::timeout(format!(
                "connection timeout after {:?}",
                config.connect_timeout
            ))
        })?
        .map_err(|e| ClientError::connection(format!("Failed to open {}: {e}", config.url)))?;
    Ok(stream)
}

impl WebSocketTransport {
    /// Connect to the backend
    ///
    /// Opens the socket and keeps its read half for [`Self::read_events_impl`].
    /// The transport becomes ready once the namespace handshake completes.
    ///
    /// # Errors
    /// Returns error if the socket cannot be opened
    pub(super) async fn connect_impl(&mut self) -> Result<()> {
        if self.reader.is_some() || self.reader_task.is_some() {
            return Ok(());
        }

        self.closing.store(false, Ordering::SeqCst);
        let stream = open_socket(&self.config).await?;
        let (writer, reader) = stream.split();
        *self.writer.lock().await = Some(writer);
        self.reader = Some(reader);

        log::info!("Opened event channel to {}", self.config.url);
        Ok(())
    }

    /// Close the transport
    ///
    /// Sends a namespace disconnect, closes the socket and stops the reader.
    ///
    /// # Errors
    /// Returns error if the disconnect frame cannot be encoded
    pub(super) async fn close_impl(&mut self) -> Result<()> {
        self.closing.store(true, Ordering::SeqCst);
        let was_ready = self.ready.swap(false, Ordering::SeqCst);

        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer {
            if was_ready {
                let frame = SocketPacket::Disconnect.to_frame()?;
                if let Err(e) = writer.send(Message::Text(frame.into())).await {
                    log::debug!("Disconnect frame not delivered: {e}");
                }
            }
            if let Err(e) = writer.close().await {
                log::debug!("Socket close not clean: {e}");
            }
        }

        self.reader = None;
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }

        log::info!("Closed event channel to {}", self.config.url);
        Ok(())
    }
}
