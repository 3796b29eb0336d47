use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
};
use tokio_tungstenite::tungstenite::{
    handshake::server::{ErrorResponse, Request, Response},
    protocol::{frame::coding::CloseCode, CloseFrame},
    Message,
};

pub const BEGIN: &str =
    r#"{"type":"Begin","id":"de5d9927-73a6-4be8-b52d-b4c07be37e6b","expires_at":1759796682}"#;
pub const TERMINATION: &str =
    r#"{"type":"Termination","audio_duration_seconds":1.5,"session_duration_seconds":2.0}"#;

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamRecord {
    Handshake {
        uri: String,
        authorization: Option<String>,
    },
    Audio(Vec<u8>),
    Text(String),
}

#[derive(Debug, Clone, Default)]
pub struct MockUpstreamConfig {
    /// Frames sent once the first audio chunk arrives.
    pub after_first_audio: Vec<String>,
    /// Close right after `Begin` with this code and reason.
    pub reject_with: Option<(u16, String)>,
}

impl MockUpstreamConfig {
    pub fn with_script(frames: &[&str]) -> Self {
        Self {
            after_first_audio: frames.iter().map(|frame| frame.to_string()).collect(),
            reject_with: None,
        }
    }

    pub fn rejecting(code: u16, reason: &str) -> Self {
        Self {
            after_first_audio: Vec::new(),
            reject_with: Some((code, reason.to_string())),
        }
    }
}

pub struct MockUpstream {
    pub url: String,
    records: mpsc::UnboundedReceiver<UpstreamRecord>,
}

impl MockUpstream {
    pub async fn next_record(&mut self) -> UpstreamRecord {
        tokio::time::timeout(Duration::from_secs(5), self.records.recv())
            .await
            .expect("timed out waiting for upstream record")
            .expect("mock upstream stopped")
    }
}

pub async fn start_mock_upstream(config: MockUpstreamConfig) -> MockUpstream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_connection(stream, tx.clone(), config.clone()));
        }
    });

    MockUpstream {
        url: format!("ws://{addr}/v3/ws"),
        records: rx,
    }
}

async fn serve_connection(
    stream: TcpStream,
    records: mpsc::UnboundedSender<UpstreamRecord>,
    config: MockUpstreamConfig,
) {
    let handshake_records = records.clone();
    let accepted = tokio_tungstenite::accept_hdr_async(
        stream,
        move |request: &Request, response: Response| {
            let authorization = request
                .headers()
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let _ = handshake_records.send(UpstreamRecord::Handshake {
                uri: request.uri().to_string(),
                authorization,
            });
            Ok::<_, ErrorResponse>(response)
        },
    )
    .await;
    let Ok(mut ws) = accepted else {
        return;
    };

    if ws.send(Message::text(BEGIN.to_string())).await.is_err() {
        return;
    }

    if let Some((code, reason)) = config.reject_with {
        let _ = ws
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: reason.into(),
            })))
            .await;
        return;
    }

    let mut scripted = false;
    while let Some(Ok(message)) = ws.next().await {
        match message {
            Message::Binary(data) => {
                let _ = records.send(UpstreamRecord::Audio(data.to_vec()));
                if !scripted {
                    scripted = true;
                    for frame in &config.after_first_audio {
                        let _ = ws.send(Message::text(frame.clone())).await;
                    }
                }
            }
            Message::Text(text) => {
                let text = text.as_str().to_string();
                let terminate = text.contains("\"Terminate\"");
                let _ = records.send(UpstreamRecord::Text(text));
                if terminate {
                    let _ = ws.send(Message::text(TERMINATION.to_string())).await;
                    let _ = ws.close(None).await;
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}
