//! WebSocket transport on `tokio-tungstenite`.
//!
//! The browser client speaks JSON, so outgoing UTF-8 goes out as text
//! frames. Incoming text and binary frames are both accepted.
//!
//! Each socket is split into a writer half and a reader half with a lock
//! apiece. A handler parked in `recv` waiting for the player's next
//! command never blocks room chatter being written to that player.

use std::net::SocketAddr;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::WebSocketStream;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

use crate::{Connection, ConnectionId, Transport, TransportError};

type Socket = WebSocketStream<TcpStream>;

/// Listens for players on a TCP port and upgrades each connection to a
/// WebSocket.
pub struct WebSocketTransport {
    listener: TcpListener,
    next_id: ConnectionId,
}

impl WebSocketTransport {
    /// Opens the listener. Port 0 lets the OS pick; read the result back
    /// with [`local_addr`](Self::local_addr).
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr).await.map_err(|source| {
            TransportError::Bind {
                addr: addr.to_string(),
                source,
            }
        })?;
        tracing::info!(addr, "listening for players");
        Ok(Self {
            listener,
            next_id: ConnectionId::new(1),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<WebSocketConnection, TransportError> {
        let (tcp, peer) =
            self.listener.accept().await.map_err(TransportError::Accept)?;

        let socket =
            tokio_tungstenite::accept_async(tcp).await.map_err(|e| {
                TransportError::Handshake {
                    peer,
                    source: Box::new(e),
                }
            })?;

        let id = self.next_id;
        self.next_id = id.next();
        tracing::debug!(%id, %peer, "player connected");

        let (writer, reader) = socket.split();
        Ok(WebSocketConnection {
            id,
            peer,
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        })
    }
}

/// One player's WebSocket.
pub struct WebSocketConnection {
    id: ConnectionId,
    peer: SocketAddr,
    writer: Mutex<SplitSink<Socket, Message>>,
    reader: Mutex<SplitStream<Socket>>,
}

/// A frame for `data`: text when it is UTF-8, binary otherwise.
fn frame_for(data: &[u8]) -> Message {
    match std::str::from_utf8(data) {
        Ok(text) => Message::Text(text.to_owned().into()),
        Err(_) => Message::Binary(data.to_vec().into()),
    }
}

/// Whether `e` just means the socket is gone.
fn is_hang_up(e: &WsError) -> bool {
    matches!(
        e,
        WsError::ConnectionClosed
            | WsError::AlreadyClosed
            | WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake)
    )
}

fn write_error(e: WsError) -> TransportError {
    if is_hang_up(&e) {
        TransportError::Closed
    } else {
        TransportError::Send(Box::new(e))
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        self.writer
            .lock()
            .await
            .send(frame_for(data))
            .await
            .map_err(write_error)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut reader = self.reader.lock().await;
        while let Some(frame) = reader.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Ok(Message::Binary(data)) => return Ok(Some(data.to_vec())),
                Ok(Message::Close(_)) => return Ok(None),
                // tungstenite answers pings itself.
                Ok(_) => {}
                Err(e) if is_hang_up(&e) => return Ok(None),
                Err(e) => return Err(TransportError::Receive(Box::new(e))),
            }
        }
        Ok(None)
    }

    async fn close(&self) -> Result<(), TransportError> {
        match self.writer.lock().await.close().await {
            Err(e) if !is_hang_up(&e) => Err(TransportError::Send(Box::new(e))),
            _ => Ok(()),
        }
    }

    fn id(&self) -> ConnectionId {
        self.id
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}
