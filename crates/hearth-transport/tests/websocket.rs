//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on a random port and a real
//! `tokio-tungstenite` client, so frames actually cross a socket.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;

    use futures_util::{SinkExt, StreamExt};
    use hearth_transport::{Connection, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    /// Binds on port 0, connects one client, and returns both ends.
    async fn connected_pair()
    -> (hearth_transport::WebSocketConnection, ClientWs) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound").to_string();

        let server =
            tokio::spawn(async move { transport.accept().await.expect("accept") });
        let client = connect_client(&addr).await;
        let conn = server.await.expect("task should complete");
        (conn, client)
    }

    #[tokio::test]
    async fn test_accept_numbers_connections_in_order() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("bound").to_string();

        let server = tokio::spawn(async move {
            let first = transport.accept().await.expect("accept");
            let second = transport.accept().await.expect("accept");
            (first, second)
        });
        let client_a = connect_client(&addr).await;
        let client_b = connect_client(&addr).await;
        let (first, second) = server.await.expect("task should complete");

        assert_eq!(first.id().into_inner(), 1);
        assert_eq!(second.id().into_inner(), 2);
        assert!(first.peer_addr().ip().is_loopback());
        drop((client_a, client_b));
    }

    #[tokio::test]
    async fn test_bind_unparseable_address_fails() {
        let result = WebSocketTransport::bind("not an address").await;
        assert!(matches!(
            result,
            Err(hearth_transport::TransportError::Bind { .. })
        ));
    }

    #[tokio::test]
    async fn test_send_utf8_arrives_as_text_frame() {
        let (conn, mut client) = connected_pair().await;

        conn.send(br#"{"type":"CreateUser"}"#).await.expect("send");

        let msg = client.next().await.unwrap().unwrap();
        assert!(msg.is_text(), "JSON should travel as a text frame");
        assert_eq!(msg.into_text().unwrap().as_str(), r#"{"type":"CreateUser"}"#);
    }

    #[tokio::test]
    async fn test_recv_accepts_text_and_binary_frames() {
        let (conn, mut client) = connected_pair().await;

        client.send(Message::Text("look".into())).await.unwrap();
        client
            .send(Message::Binary(vec![1u8, 2, 3].into()))
            .await
            .unwrap();

        assert_eq!(conn.recv().await.unwrap(), Some(b"look".to_vec()));
        assert_eq!(conn.recv().await.unwrap(), Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_recv_returns_none_after_client_close() {
        let (conn, mut client) = connected_pair().await;

        client.close(None).await.unwrap();

        assert_eq!(conn.recv().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_close_twice_is_not_an_error() {
        let (conn, mut client) = connected_pair().await;

        conn.close().await.expect("first close");
        conn.close().await.expect("second close");

        let frame = client.next().await;
        assert!(matches!(frame, Some(Ok(Message::Close(_))) | None));
    }

    #[tokio::test]
    async fn test_send_while_another_task_is_receiving() {
        // A reader parked in recv() must not block writers: this is how
        // the server pushes room chatter while waiting for the next command.
        let (conn, mut client) = connected_pair().await;
        let conn = Arc::new(conn);

        let reader = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.recv().await })
        };
        tokio::task::yield_now().await;

        conn.send(b"Ayla says: hi").await.expect("send while reading");
        let pushed = client.next().await.unwrap().unwrap();
        assert_eq!(pushed.into_text().unwrap().as_str(), "Ayla says: hi");

        client.send(Message::Text("who".into())).await.unwrap();
        let received = reader.await.unwrap().unwrap();
        assert_eq!(received, Some(b"who".to_vec()));
    }
}
