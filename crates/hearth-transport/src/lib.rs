//! How players' frames reach the server.
//!
//! The server only ever talks to the two traits here: a [`Transport`]
//! hands out [`Connection`]s, and each connection moves opaque byte frames
//! in both directions. What the bytes mean is the protocol crate's
//! business.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`] on `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::{BoxError, TransportError};
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::net::SocketAddr;

/// Numbers the connections a transport has accepted, starting at 1.
///
/// A player's session id is derived from this, so a transport never hands
/// out the same number twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn into_inner(self) -> u64 {
        self.0
    }

    /// The id after this one.
    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A listener that produces player connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next player to connect.
    ///
    /// An error here concerns one would-be connection only (a failed
    /// upgrade, a reset during accept); callers log it and keep accepting.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// One player's link to the server.
///
/// `send` and `recv` are called concurrently from different tasks: one
/// reads the player's commands while the other pushes what the rest of the
/// room is doing.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    /// Sends one frame.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next frame, or `Ok(None)` once the player has gone,
    /// whether they said goodbye or simply vanished.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection. Closing twice is not an error.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    /// Where the player is connecting from.
    fn peer_addr(&self) -> SocketAddr;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_next_counts_up() {
        let first = ConnectionId::new(1);
        assert_eq!(first.next().into_inner(), 2);
        assert!(first < first.next());
    }

    #[test]
    fn test_connection_id_display_is_numbered() {
        assert_eq!(ConnectionId::new(7).to_string(), "#7");
    }
}
