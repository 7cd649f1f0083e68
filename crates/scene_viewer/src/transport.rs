//! WebSocket transport for the sync channel
//!
//! Wraps a non-blocking `tungstenite` client socket behind the engine's
//! [`Transport`] seam. The handshake happens in [`WebSocketTransport::connect`];
//! the synthetic `Opened` event is delivered on the first poll so the channel
//! sees the same lifecycle a fully async transport would produce.

use std::net::TcpStream;

use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};
use view_engine::sync::{SyncError, Transport, TransportEvent};

/// Blocking-connect, non-blocking-poll WebSocket transport
pub struct WebSocketTransport {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    opened_pending: bool,
}

impl WebSocketTransport {
    /// Connect to a `ws://` or `wss://` URL
    pub fn connect(url: &str) -> Result<Self, SyncError> {
        let (socket, response) =
            tungstenite::connect(url).map_err(|e| SyncError::Connection(e.to_string()))?;
        log::info!("websocket connected to {url} ({})", response.status());

        if let MaybeTlsStream::Plain(stream) = socket.get_ref() {
            stream
                .set_nonblocking(true)
                .map_err(|e| SyncError::Connection(e.to_string()))?;
        }

        Ok(Self {
            socket,
            opened_pending: true,
        })
    }
}

impl Transport for WebSocketTransport {
    fn poll_event(&mut self) -> Option<TransportEvent> {
        if self.opened_pending {
            self.opened_pending = false;
            return Some(TransportEvent::Opened);
        }

        match self.socket.read() {
            Ok(Message::Text(text)) => Some(TransportEvent::Frame(text)),
            Ok(Message::Close(_)) => Some(TransportEvent::Closed),
            // Ping/pong are answered by tungstenite; binary frames are not
            // part of the protocol.
            Ok(_) => None,
            Err(tungstenite::Error::Io(e)) if e.kind() == std::io::ErrorKind::WouldBlock => None,
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                Some(TransportEvent::Closed)
            }
            Err(e) => Some(TransportEvent::Errored(e.to_string())),
        }
    }

    fn send_text(&mut self, text: &str) -> Result<(), SyncError> {
        self.socket
            .send(Message::Text(text.to_string()))
            .map_err(|e| SyncError::Connection(e.to_string()))
    }
}
