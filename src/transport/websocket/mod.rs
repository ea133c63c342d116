//! WebSocket transport for the persistent event channel
//!
//! This module provides a transport implementation that connects to the
//! backend's Socket.IO endpoint over a WebSocket, answers the handshake and
//! heartbeats, and reconnects natively after a drop.

mod config;
mod lifecycle;
mod reader;
mod transport;

// Re-export public types
pub use config::WebSocketConfig;
pub use transport::WebSocketTransport;
