//! Frame reading and native reconnection for the WebSocket transport

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::tungstenite::Message;

use crate::error::{ClientError, Result};
use crate::protocol::{FrameAction, ProtocolHandler};

use super::super::TransportEvent;
use super::config::WebSocketConfig;
use super::lifecycle::open_socket;
use super::transport::{WebSocketTransport, WsReader, WsStream, WsWriter};

type EventSender = mpsc::UnboundedSender<Result<TransportEvent>>;

impl WebSocketTransport {
    /// Read events from the socket
    ///
    /// This method spawns a background task that decodes frames, answers
    /// handshake and heartbeat packets, forwards application events, and
    /// reconnects with backoff after the socket drops.
    ///
    /// # Returns
    /// A receiver that yields channel events or errors
    pub(super) fn read_events_impl(&mut self) -> mpsc::UnboundedReceiver<Result<TransportEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();

        let reader = self.reader.take();
        let config = self.config.clone();
        let writer = Arc::clone(&self.writer);
        let ready = Arc::clone(&self.ready);
        let closing = Arc::clone(&self.closing);

        let task = tokio::spawn(async move {
            let Some(mut reader) = reader else {
                let _ = tx.send(Err(ClientError::connection(
                    "Not connected - socket not available",
                )));
                return;
            };
            let mut handler = ProtocolHandler::new();

            loop {
                let receiver_alive = pump_socket(&mut reader, &mut handler, &writer, &ready, &tx).await;

                let was_ready = ready.swap(false, Ordering::SeqCst);
                writer.lock().await.take();
                handler.reset();

                if was_ready && tx.send(Ok(TransportEvent::Disconnected)).is_err() {
                    break;
                }
                if !receiver_alive || closing.load(Ordering::SeqCst) {
                    break;
                }

                let Some(stream) = reconnect(&config, &closing).await else {
                    break;
                };
                let (new_writer, new_reader) = stream.split();
                *writer.lock().await = Some(new_writer);
                reader = new_reader;
            }
        });

        self.reader_task = Some(task);
        rx
    }
}

/// Drive one socket until it ends. Returns false once the event receiver is gone.
async fn pump_socket(
    reader: &mut WsReader,
    handler: &mut ProtocolHandler,
    writer: &Arc<Mutex<Option<WsWriter>>>,
    ready: &Arc<AtomicBool>,
    tx: &EventSender,
) -> bool {
    while let Some(frame) = reader.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                log::warn!("Event channel read failed: {e}");
                break;
            }
        };

        let action = match handler.handle_frame(text.as_str()) {
            Ok(action) => action,
            Err(e) => {
                log::warn!("Dropping undecodable frame: {e}");
                if tx.send(Err(e)).is_err() {
                    return false;
                }
                continue;
            }
        };

        match action {
            FrameAction::Reply(reply) => {
                let mut guard = writer.lock().await;
                let Some(sink) = guard.as_mut() else {
                    break;
                };
                if let Err(e) = sink.send(Message::Text(reply.into())).await {
                    log::error!("Failed to answer protocol frame: {e}");
                    break;
                }
            }
            FrameAction::Connected => {
                ready.store(true, Ordering::SeqCst);
                log::info!("Event channel connected");
                if tx.send(Ok(TransportEvent::Connected)).is_err() {
                    return false;
                }
            }
            FrameAction::Disconnected => break,
            FrameAction::Event(event) => {
                log::debug!("Received '{}'", event.name());
                if tx.send(Ok(TransportEvent::Event(event))).is_err() {
                    return false;
                }
            }
            FrameAction::ConnectError(message) => {
                log::warn!("Backend refused the channel: {message}");
                if tx
                    .send(Err(ClientError::connection(format!(
                        "Backend refused the channel: {message}"
                    ))))
                    .is_err()
                {
                    return false;
                }
            }
            FrameAction::Ignore => {}
        }
    }
    !tx.is_closed()
}

/// Retry with backoff until a socket opens or the transport is closed
async fn reconnect(config: &WebSocketConfig, closing: &AtomicBool) -> Option<WsStream> {
    let mut attempt = 0u32;
    loop {
        tokio::time::sleep(config.backoff(attempt)).await;
        if closing.load(Ordering::SeqCst) {
            return None;
        }

        match open_socket(config).await {
            Ok(stream) => {
                log::info!("Reconnected to {} after {} attempt(s)", config.url, attempt + 1);
                return Some(stream);
            }
            Err(e) => {
                log::warn!("Reconnect attempt {} failed: {e}", attempt + 1);
                attempt = attempt.saturating_add(1);
            }
        }
    }
}
