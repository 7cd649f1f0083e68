//! Scene synchronization over a message transport
//!
//! [`protocol`] defines the wire shape of server messages and client
//! requests; [`channel`] owns the connection lifecycle and applies decoded
//! messages to the registry. The transport itself is a seam so the engine
//! stays testable without sockets.

pub mod channel;
pub mod protocol;

pub use channel::{ConnectionState, SyncChannel, SyncError, Transport, TransportEvent};
pub use protocol::{ClientRequest, ServerMessage};
