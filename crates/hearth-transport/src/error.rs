use std::net::SocketAddr;

/// Any error from the WebSocket library, boxed so this enum doesn't depend
/// on which transport is compiled in.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The listener could not be opened.
    #[error("could not bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The listener failed to hand over the next TCP stream.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// A client connected but never completed the WebSocket upgrade.
    #[error("handshake with {peer} failed: {source}")]
    Handshake {
        peer: SocketAddr,
        #[source]
        source: BoxError,
    },

    /// The connection is already closed; nothing more can be written.
    #[error("connection closed")]
    Closed,

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    Send(#[source] BoxError),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    Receive(#[source] BoxError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_error_names_the_address() {
        let err = TransportError::Bind {
            addr: "0.0.0.0:80".into(),
            source: std::io::ErrorKind::PermissionDenied.into(),
        };
        assert!(err.to_string().starts_with("could not bind 0.0.0.0:80"));
    }

    #[test]
    fn test_handshake_error_names_the_peer() {
        let err = TransportError::Handshake {
            peer: "127.0.0.1:5555".parse().unwrap(),
            source: "not a websocket request".into(),
        };
        assert_eq!(
            err.to_string(),
            "handshake with 127.0.0.1:5555 failed: not a websocket request"
        );
    }
}
