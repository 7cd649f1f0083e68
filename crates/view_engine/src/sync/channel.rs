//! Connection lifecycle and message application
//!
//! [`SyncChannel`] sits between a [`Transport`] and the registry. It owns
//! the connection state machine, requests a snapshot on open, and applies
//! each decoded message in arrival order. Transport and decode faults are
//! reported through the notifier and never poison the channel itself.

use thiserror::Error;

use crate::events::{Notifier, ViewerEvent};
use crate::scene::registry::ObjectRegistry;
use crate::sync::protocol::{ClientRequest, ServerMessage};

/// Synchronization errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// The frame carries a `type` tag outside the protocol
    #[error("unknown message type: {0}")]
    UnknownMessage(String),

    /// The frame could not be decoded
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    /// The transport failed to deliver a frame
    #[error("connection error: {0}")]
    Connection(String),

    /// The operation needs a live connection
    #[error("not connected")]
    NotConnected,
}

/// Connection state of the sync channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport attached
    Disconnected,
    /// Transport attached, waiting for the open handshake
    Connecting,
    /// Open and exchanging messages
    Connected,
    /// The transport failed; a new connect is required
    Errored,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Errored => "errored",
        };
        f.write_str(label)
    }
}

/// One observation from the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The connection finished opening
    Opened,
    /// One complete text frame arrived
    Frame(String),
    /// The peer closed the connection
    Closed,
    /// The transport failed
    Errored(String),
}

/// Non-blocking message transport
///
/// Implementations deliver events in order and must not block in
/// [`Transport::poll_event`]; `None` means nothing is pending right now.
pub trait Transport: Send {
    /// Poll for the next pending event, if any
    fn poll_event(&mut self) -> Option<TransportEvent>;

    /// Send one text frame to the peer
    fn send_text(&mut self, text: &str) -> Result<(), SyncError>;
}

/// Channel applying server messages to the registry
pub struct SyncChannel {
    transport: Option<Box<dyn Transport>>,
    state: ConnectionState,
    notifier: Notifier,
}

impl SyncChannel {
    /// Create a disconnected channel
    pub fn new(notifier: Notifier) -> Self {
        Self {
            transport: None,
            state: ConnectionState::Disconnected,
            notifier,
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Attach a transport and start waiting for its open handshake.
    ///
    /// Any previous transport is dropped.
    pub fn connect(&mut self, transport: Box<dyn Transport>) {
        self.transport = Some(transport);
        self.set_state(ConnectionState::Connecting);
    }

    /// Drop the transport, if any
    pub fn disconnect(&mut self) {
        self.transport = None;
        self.set_state(ConnectionState::Disconnected);
    }

    /// Ask the server for a full scene snapshot
    pub fn request_sync(&mut self) -> Result<(), SyncError> {
        let transport = self.transport.as_mut().ok_or(SyncError::NotConnected)?;
        log::info!("requesting scene snapshot");
        transport.send_text(&ClientRequest::Sync.encode())
    }

    /// Drain pending transport events and apply them to the registry.
    ///
    /// Call once per tick. Decode faults skip the offending frame; transport
    /// closure and failure detach the transport.
    pub fn pump(&mut self, registry: &mut ObjectRegistry) {
        let mut events = Vec::new();
        if let Some(transport) = self.transport.as_mut() {
            while let Some(event) = transport.poll_event() {
                let terminal =
                    matches!(event, TransportEvent::Closed | TransportEvent::Errored(_));
                events.push(event);
                if terminal {
                    break;
                }
            }
        }

        for event in events {
            self.handle_event(event, registry);
        }
    }

    fn handle_event(&mut self, event: TransportEvent, registry: &mut ObjectRegistry) {
        match event {
            TransportEvent::Opened => {
                self.set_state(ConnectionState::Connected);
                if let Err(e) = self.request_sync() {
                    log::error!("snapshot request failed: {e}");
                    self.fault(format!("snapshot request failed: {e}"));
                }
            }
            TransportEvent::Frame(text) => self.apply_frame(&text, registry),
            TransportEvent::Closed => {
                log::info!("server closed the connection");
                self.transport = None;
                self.set_state(ConnectionState::Disconnected);
            }
            TransportEvent::Errored(reason) => {
                log::error!("transport failed: {reason}");
                self.fault(format!("transport failed: {reason}"));
                self.transport = None;
                self.set_state(ConnectionState::Errored);
            }
        }
    }

    fn apply_frame(&mut self, text: &str, registry: &mut ObjectRegistry) {
        let message = match ServerMessage::parse(text) {
            Ok(message) => message,
            Err(SyncError::UnknownMessage(tag)) => {
                // Newer servers may speak more tags; skip the frame but let
                // observers know the peer is ahead of us.
                log::warn!("ignoring unknown message type '{tag}'");
                self.fault(format!("ignoring unknown message type '{tag}'"));
                return;
            }
            Err(e) => {
                log::error!("dropping frame: {e}");
                self.fault(format!("dropping frame: {e}"));
                return;
            }
        };

        match message {
            ServerMessage::Sync(records) => registry.reset(&records),
            ServerMessage::Add(record) => {
                if let Err(e) = registry.add(&record) {
                    log::error!("rejected add for '{}': {e}", record.id);
                    self.fault(format!("rejected add for '{}': {e}", record.id));
                }
            }
            ServerMessage::Remove(id) => {
                registry.remove(&id);
            }
            ServerMessage::Show(id) => {
                registry.set_visible(&id, true);
            }
            ServerMessage::Hide(id) => {
                registry.set_visible(&id, false);
            }
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state == state {
            return;
        }
        log::info!("connection state: {} -> {}", self.state, state);
        self.state = state;
        self.notifier.emit(&ViewerEvent::ConnectionChanged(state));
    }

    fn fault(&self, message: String) {
        self.notifier.emit(&ViewerEvent::Fault(message));
    }
}
