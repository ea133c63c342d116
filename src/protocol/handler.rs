//! Protocol handler for the persistent channel handshake and framing

use crate::error::Result;

use super::codec::{EnginePacket, OpenHandshake, SocketPacket};
use super::events::{ServerEvent, parse_event};

/// What the transport should do with a decoded frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameAction {
    /// Write this frame back (handshake step or heartbeat reply)
    Reply(String),
    /// Namespace connected; the channel is usable
    Connected,
    /// Server closed the namespace or the engine session
    Disconnected,
    /// Application event
    Event(ServerEvent),
    /// Server refused the namespace connection
    ConnectError(String),
    /// Nothing to do
    Ignore,
}

/// Protocol handler for one engine session
///
/// One handler lives per WebSocket connection; it is reset whenever the
/// transport reconnects.
#[derive(Debug, Default)]
pub struct ProtocolHandler {
    handshake: Option<OpenHandshake>,
    connected: bool,
}

impl ProtocolHandler {
    /// Create a new protocol handler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the namespace is connected
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Engine handshake of the current connection, once received
    #[must_use]
    pub const fn handshake(&self) -> Option<&OpenHandshake> {
        self.handshake.as_ref()
    }

    /// Forget the current engine session
    pub fn reset(&mut self) {
        self.handshake = None;
        self.connected = false;
    }

    /// Handle one inbound WebSocket text frame
    ///
    /// # Errors
    /// Returns a protocol error for undecodable frames, or an event parse error
    /// when a known event carries a malformed payload
    pub fn handle_frame(&mut self, frame: &str) -> Result<FrameAction> {
        match EnginePacket::decode(frame)? {
            EnginePacket::Open(handshake) => {
                log::debug!(
                    "Engine session {} opened (ping interval {}ms)",
                    handshake.sid,
                    handshake.ping_interval
                );
                self.handshake = Some(handshake);
                Ok(FrameAction::Reply(SocketPacket::Connect(None).to_frame()?))
            }
            EnginePacket::Ping(payload) => Ok(FrameAction::Reply(EnginePacket::Pong(payload).encode())),
            EnginePacket::Close => {
                self.reset();
                Ok(FrameAction::Disconnected)
            }
            EnginePacket::Message(body) => self.handle_socket_packet(&body),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => {
                Ok(FrameAction::Ignore)
            }
        }
    }

    fn handle_socket_packet(&mut self, body: &str) -> Result<FrameAction> {
        match SocketPacket::decode(body)? {
            SocketPacket::Connect(_) => {
                self.connected = true;
                Ok(FrameAction::Connected)
            }
            SocketPacket::Disconnect => {
                self.connected = false;
                Ok(FrameAction::Disconnected)
            }
            SocketPacket::Event { name, data } => {
                let event = parse_event(&name, data)?;
                Ok(FrameAction::Event(event))
            }
            SocketPacket::ConnectError(value) => {
                let message = value
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map_or_else(|| value.to_string(), String::from);
                Ok(FrameAction::ConnectError(message))
            }
            SocketPacket::Unsupported(kind) => {
                log::debug!("Ignoring unsupported socket packet type '{kind}'");
                Ok(FrameAction::Ignore)
            }
        }
    }
}
