#![allow(dead_code)]

pub mod mock_upstream;

#[allow(unused_imports)]
pub use mock_upstream::{start_mock_upstream, MockUpstream, MockUpstreamConfig, UpstreamRecord};

use std::{net::SocketAddr, time::Duration};

use futures_util::StreamExt;
use live_transcribe_lib::{router, ServerConfig, TranscriberConfig};
use tokio_tungstenite::{tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub type ClientSocket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub async fn start_server(transcriber: TranscriberConfig) -> SocketAddr {
    start_server_with(ServerConfig::new(
        SocketAddr::from(([127, 0, 0, 1], 0)),
        transcriber,
    ))
    .await
}

pub async fn start_server_with(config: ServerConfig) -> SocketAddr {
    let app = router(&config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

pub async fn start_server_with_upstream(upstream: &MockUpstream) -> SocketAddr {
    start_server(
        TranscriberConfig::new(Some("test-key".to_string())).with_streaming_url(&upstream.url),
    )
    .await
}

pub async fn connect_client(addr: SocketAddr, query: &str) -> ClientSocket {
    let (socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws{query}"))
        .await
        .expect("failed to connect to relay");
    socket
}

/// Next JSON text frame, skipping control frames. `None` once the relay closes.
pub async fn next_client_message(client: &mut ClientSocket) -> Option<serde_json::Value> {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for relay message")?;
        match message {
            Ok(Message::Text(text)) => {
                return Some(serde_json::from_str(text.as_str()).expect("relay sent invalid JSON"))
            }
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}
