//! Wire protocol for the persistent event channel
//!
//! This module provides the frame codec, the outbound command vocabulary,
//! the inbound event vocabulary and the handler that drives the channel
//! handshake.
//!
//! # Overview
//!
//! - [`codec`] encodes and decodes Engine.IO / Socket.IO text frames
//! - [`OutboundCommand`] is everything the client may send
//! - [`ServerEvent`] is everything the backend may push
//! - [`ProtocolHandler`] turns raw frames into [`FrameAction`]s
//!
//! # Example: Encoding a Command
//!
//! ```rust
//! use jobsync_client::protocol::OutboundCommand;
//! use jobsync_client::SessionId;
//!
//! let command = OutboundCommand::StopChecker {
//!     session_id: SessionId::new("abc"),
//! };
//! let frame = command.to_frame().unwrap();
//! assert_eq!(frame, r#"42["stop_checker",{"session_id":"abc"}]"#);
//! ```
//!
//! # Example: Handling Frames
//!
//! ```rust
//! use jobsync_client::protocol::{FrameAction, ProtocolHandler};
//!
//! let mut handler = ProtocolHandler::new();
//! let open = r#"0{"sid":"e1","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;
//! assert_eq!(
//!     handler.handle_frame(open).unwrap(),
//!     FrameAction::Reply("40".to_string())
//! );
//! assert_eq!(handler.handle_frame("40{\"sid\":\"s1\"}").unwrap(), FrameAction::Connected);
//! assert_eq!(
//!     handler.handle_frame("2").unwrap(),
//!     FrameAction::Reply("3".to_string())
//! );
//! ```

pub mod codec;
mod commands;
mod events;
mod handler;

// Re-export public types
pub use codec::{EnginePacket, OpenHandshake, SocketPacket};
pub use commands::OutboundCommand;
pub use events::{
    PreviousState, ResultsPayload, ServerEvent, UploadConfirmation, parse_event,
};
pub use handler::{FrameAction, ProtocolHandler};
