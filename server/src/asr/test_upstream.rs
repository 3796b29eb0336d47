use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::{net::TcpListener, sync::mpsc};
use tokio_tungstenite::tungstenite::{protocol::CloseFrame, Message};

/// Accepts one websocket connection and forwards every data frame it reads.
/// With `close_with`, a close frame is sent right after the handshake.
pub async fn spawn_upstream(
    close_with: Option<CloseFrame>,
) -> (String, mpsc::UnboundedReceiver<Message>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/v3/ws", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
            return;
        };
        if let Some(frame) = close_with {
            let _ = ws.send(Message::Close(Some(frame))).await;
        }
        while let Some(Ok(message)) = ws.next().await {
            if matches!(message, Message::Binary(_) | Message::Text(_)) && tx.send(message).is_err()
            {
                break;
            }
        }
    });

    (url, rx)
}

/// Accepts TCP connections and never answers the websocket handshake.
pub async fn spawn_stalled_listener() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}/v3/ws", listener.local_addr().unwrap());

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    url
}

/// Everything received until the upstream goes quiet for 200ms.
pub async fn drain(received: &mut mpsc::UnboundedReceiver<Message>) -> Vec<Message> {
    let mut frames = Vec::new();
    while let Ok(Some(frame)) =
        tokio::time::timeout(Duration::from_millis(200), received.recv()).await
    {
        frames.push(frame);
    }
    frames
}
