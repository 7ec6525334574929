//! Integration tests for the WebSocket transport.
//!
//! These spin up a real listener on an OS-assigned port and talk to it
//! with a `tokio-tungstenite` client, or with our own upstream dialer.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use gatehouse_transport::{
        Connection, Frame, Transport, UpstreamConnection, WebSocketConnection,
        WebSocketTransport,
    };
    use tokio_tungstenite::tungstenite::Message;

    type ClientWs = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    /// Binds on a random port and accepts exactly one connection in the
    /// background. Returns the address and the pending server side.
    async fn listen_once() -> (String, tokio::task::JoinHandle<WebSocketConnection>) {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport.local_addr().expect("local addr").to_string();
        let handle = tokio::spawn(async move {
            let pending = transport.accept().await.expect("should accept");
            WebSocketTransport::upgrade(pending)
                .await
                .expect("should upgrade")
        });
        (addr, handle)
    }

    async fn connect_client(addr: &str) -> ClientWs {
        let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
            .await
            .expect("client should connect");
        ws
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (addr, server_handle) = listen_once().await;
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.expect("task should complete");

        assert!(server_conn.id().into_inner() > 0);

        server_conn
            .send(Frame::from(&b"hello from server"[..]))
            .await
            .expect("send should succeed");
        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"hello from server");

        client_ws
            .send(Message::Binary(b"hello from client".to_vec().into()))
            .await
            .unwrap();
        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, Frame::Binary(b"hello from client".to_vec()));

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (addr, server_handle) = listen_once().await;
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_websocket_send_while_recv_pending_does_not_block() {
        let (addr, server_handle) = listen_once().await;
        let mut client_ws = connect_client(&addr).await;
        let server_conn = Arc::new(server_handle.await.unwrap());

        // Park a reader on the server side; the client sends nothing yet.
        let reader = Arc::clone(&server_conn);
        let pending = tokio::spawn(async move { reader.recv().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_secs(1), server_conn.send(Frame::from(&b"ping"[..])))
            .await
            .expect("send must not wait for the pending recv")
            .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), b"ping");

        client_ws
            .send(Message::Binary(b"pong".to_vec().into()))
            .await
            .unwrap();
        let got = pending.await.unwrap().unwrap();
        assert_eq!(got, Some(Frame::Binary(b"pong".to_vec())));
    }

    #[tokio::test]
    async fn test_upstream_connect_round_trip() {
        let (addr, server_handle) = listen_once().await;
        let upstream = UpstreamConnection::connect(&format!("ws://{addr}"))
            .await
            .expect("should dial");
        let server_conn = server_handle.await.unwrap();

        upstream.send(Frame::from(&b"handshake"[..])).await.unwrap();
        assert_eq!(
            server_conn.recv().await.unwrap(),
            Some(Frame::Binary(b"handshake".to_vec()))
        );

        upstream.close().await.unwrap();
        assert!(server_conn.recv().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_websocket_text_frames_stay_text_both_ways() {
        let (addr, server_handle) = listen_once().await;
        let mut client_ws = connect_client(&addr).await;
        let server_conn = server_handle.await.unwrap();

        client_ws
            .send(Message::Text(String::from(r#"{"type":"ClientConnect"}"#).into()))
            .await
            .unwrap();
        let got = server_conn.recv().await.unwrap().expect("frame");
        assert_eq!(got, Frame::Text(r#"{"type":"ClientConnect"}"#.to_string()));

        server_conn.send(got).await.unwrap();
        let echoed = client_ws.next().await.unwrap().unwrap();
        assert!(echoed.is_text(), "text must not come back as binary");
        assert_eq!(echoed.into_text().unwrap().as_str(), r#"{"type":"ClientConnect"}"#);
    }

    #[tokio::test]
    async fn test_accept_returns_before_upgrade_so_idle_socket_does_not_block() {
        let mut transport = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr().unwrap().to_string();

        // Opens TCP, never sends the HTTP upgrade.
        let _idle = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let idle_pending = tokio::time::timeout(Duration::from_secs(1), transport.accept())
            .await
            .expect("accept must not wait for the upgrade")
            .unwrap();

        let client = tokio::spawn({
            let addr = addr.clone();
            async move { connect_client(&addr).await }
        });
        let pending = tokio::time::timeout(Duration::from_secs(1), transport.accept())
            .await
            .expect("second socket accepted while the first idles")
            .unwrap();
        let conn = WebSocketTransport::upgrade(pending).await.expect("upgrade");
        let _client_ws = client.await.unwrap();

        assert!(conn.id().into_inner() > 0);
        drop(idle_pending);
    }

    #[tokio::test]
    async fn test_upstream_connect_refused_returns_error() {
        // Bind then drop to get a port nobody is listening on.
        let addr = {
            let t = WebSocketTransport::bind("127.0.0.1:0").await.unwrap();
            t.local_addr().unwrap()
        };
        let result = UpstreamConnection::connect(&format!("ws://{addr}")).await;
        assert!(matches!(
            result,
            Err(gatehouse_transport::TransportError::ConnectFailed { .. })
        ));
    }
}
