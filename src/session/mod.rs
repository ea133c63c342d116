//! Session identity, state and event application
//!
//! - [`store`] resolves and persists the session id
//! - [`context`] owns the per-session state
//! - [`channel`] applies the handshake and backend events to that state

pub mod channel;
pub mod context;
pub mod store;

pub use channel::SessionChannel;
pub use context::{ConnectionState, SessionContext, TransportConfig};
pub use store::{FileStorage, MemoryStorage, PageLocation, SessionStorage, SessionStore};
