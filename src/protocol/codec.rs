//! Frame codec for the persistent event channel
//!
//! The backend speaks Socket.IO (protocol 5) on top of Engine.IO (protocol 4)
//! over a WebSocket. Every WebSocket text frame is one Engine.IO packet whose
//! first character is the packet type; Socket.IO packets ride inside Engine.IO
//! `message` packets.
//!
//! ```text
//! 0{"sid":"..","pingInterval":25000,..}   engine open
//! 2 / 3                                  engine ping / pong
//! 40 / 40{"sid":".."}                    socket connect / connected
//! 42["stats_update",{..}]                socket event
//! 44{"message":".."}                     socket connect error
//! ```

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ClientError, Result};

/// Engine.IO open handshake payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    /// Engine session id (distinct from the job session id)
    pub sid: String,
    /// Transports the server offers to upgrade to
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Server ping interval in milliseconds
    #[serde(default)]
    pub ping_interval: u64,
    /// Server ping timeout in milliseconds
    #[serde(default)]
    pub ping_timeout: u64,
    /// Maximum payload size accepted by the server
    #[serde(default)]
    pub max_payload: Option<u64>,
}

/// Engine.IO packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    /// Handshake sent by the server on connect
    Open(OpenHandshake),
    /// Transport is closing
    Close,
    /// Heartbeat probe, with optional payload
    Ping(String),
    /// Heartbeat reply, with optional payload
    Pong(String),
    /// Carries a Socket.IO packet
    Message(String),
    /// Transport upgrade
    Upgrade,
    /// No operation
    Noop,
}

impl EnginePacket {
    /// Decode one WebSocket text frame
    ///
    /// # Errors
    /// Returns a protocol error for empty frames, unknown packet types or a
    /// malformed open handshake
    pub fn decode(frame: &str) -> Result<Self> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ClientError::protocol("empty engine frame"))?;
        let body = chars.as_str();

        match kind {
            '0' => {
                let handshake: OpenHandshake = serde_json::from_str(body).map_err(|e| {
                    ClientError::protocol(format!("malformed open handshake: {e}"))
                })?;
                Ok(Self::Open(handshake))
            }
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(body.to_string())),
            '3' => Ok(Self::Pong(body.to_string())),
            '4' => Ok(Self::Message(body.to_string())),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(ClientError::protocol(format!(
                "unknown engine packet type '{other}'"
            ))),
        }
    }

    /// Encode as a WebSocket text frame
    ///
    /// The open handshake is server-only and encodes to its bare type digit.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Open(_) => "0".to_string(),
            Self::Close => "1".to_string(),
            Self::Ping(payload) => format!("2{payload}"),
            Self::Pong(payload) => format!("3{payload}"),
            Self::Message(payload) => format!("4{payload}"),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

/// Socket.IO packet (default namespace only)
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    /// Namespace connect request (client) or acknowledgment (server)
    Connect(Option<Value>),
    /// Namespace disconnect
    Disconnect,
    /// Named event with an optional single payload
    Event {
        /// Event name
        name: String,
        /// First argument, if any
        data: Option<Value>,
    },
    /// Server refused the namespace connection
    ConnectError(Value),
    /// Ack and binary packets; not used by this protocol
    Unsupported(char),
}

impl SocketPacket {
    /// Decode the body of an engine `message` packet
    ///
    /// # Errors
    /// Returns a protocol error for malformed packets
    pub fn decode(packet: &str) -> Result<Self> {
        let mut chars = packet.chars();
        let kind = chars
            .next()
            .ok_or_else(|| ClientError::protocol("empty socket packet"))?;
        let rest = strip_namespace_and_ack(chars.as_str());

        match kind {
            '0' => Ok(Self::Connect(parse_optional_json(rest)?)),
            '1' => Ok(Self::Disconnect),
            '2' => {
                let value: Value = serde_json::from_str(rest)
                    .map_err(|e| ClientError::protocol(format!("malformed event packet: {e}")))?;
                let Value::Array(mut args) = value else {
                    return Err(ClientError::protocol("event packet is not an array"));
                };
                if args.is_empty() {
                    return Err(ClientError::protocol("event packet has no name"));
                }
                let Value::String(name) = args.remove(0) else {
                    return Err(ClientError::protocol("event name is not a string"));
                };
                let data = if args.is_empty() {
                    None
                } else {
                    Some(args.remove(0))
                };
                Ok(Self::Event { name, data })
            }
            '4' => Ok(Self::ConnectError(
                parse_optional_json(rest)?.unwrap_or(Value::Null),
            )),
            '3' | '5' | '6' => Ok(Self::Unsupported(kind)),
            other => Err(ClientError::protocol(format!(
                "unknown socket packet type '{other}'"
            ))),
        }
    }

    /// Encode as the body of an engine `message` packet
    ///
    /// # Errors
    /// Returns error if the payload cannot be serialized
    pub fn encode(&self) -> Result<String> {
        match self {
            Self::Connect(None) => Ok("0".to_string()),
            Self::Connect(Some(auth)) => Ok(format!("0{}", serde_json::to_string(auth)?)),
            Self::Disconnect => Ok("1".to_string()),
            Self::Event { name, data } => {
                let mut args = vec![Value::String(name.clone())];
                if let Some(data) = data {
                    args.push(data.clone());
                }
                Ok(format!("2{}", serde_json::to_string(&args)?))
            }
            Self::ConnectError(value) => Ok(format!("4{}", serde_json::to_string(value)?)),
            Self::Unsupported(kind) => Err(ClientError::protocol(format!(
                "cannot encode unsupported socket packet '{kind}'"
            ))),
        }
    }

    /// Encode straight to a WebSocket text frame
    ///
    /// # Errors
    /// Returns error if the payload cannot be serialized
    pub fn to_frame(&self) -> Result<String> {
        Ok(EnginePacket::Message(self.encode()?).encode())
    }
}

/// Skip a `/namespace,` prefix and a numeric ack id, leaving the JSON body
fn strip_namespace_and_ack(body: &str) -> &str {
    let body = if body.starts_with('/') {
        body.split_once(',').map_or("", |(_, rest)| rest)
    } else {
        body
    };
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

fn parse_optional_json(body: &str) -> Result<Option<Value>> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| ClientError::protocol(format!("malformed packet payload: {e}")))
}
