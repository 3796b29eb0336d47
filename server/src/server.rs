use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, info_span, warn, Instrument};
use transcribe_core::ClientMessage;
use uuid::Uuid;

use crate::{
    config::{ServerConfig, TranscriberConfig, SAMPLE_RATE_RANGE},
    error::TranscriberError,
    session::streaming_transcriber::{StreamingTranscriber, CLIENT_CHANNEL_CAPACITY},
};

struct AppState {
    transcriber: TranscriberConfig,
}

#[derive(Debug, Deserialize)]
struct StreamParams {
    #[serde(default)]
    sample_rate: Option<u32>,
}

pub fn router(config: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        transcriber: config.transcriber.clone(),
    });

    let router = Router::new()
        .route("/ws", get(ws_upgrade))
        .route("/health", get(|| async { "ok" }))
        .with_state(state);

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(params): Query<StreamParams>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let mut config = state.transcriber.clone();
    if let Some(sample_rate) = params.sample_rate {
        if !SAMPLE_RATE_RANGE.contains(&sample_rate) {
            return (
                StatusCode::BAD_REQUEST,
                format!(
                    "sample_rate must be between {} and {}",
                    SAMPLE_RATE_RANGE.start(),
                    SAMPLE_RATE_RANGE.end()
                ),
            )
                .into_response();
        }
        config = config.with_sample_rate(sample_rate);
    }

    let connection_id = Uuid::new_v4();
    ws.on_upgrade(move |socket| {
        handle_socket(socket, config).instrument(info_span!("ws_connection", %connection_id))
    })
    .into_response()
}

async fn handle_socket(socket: WebSocket, config: TranscriberConfig) {
    info!(sample_rate = config.sample_rate, "client connected");

    let (sink, mut stream) = socket.split();
    let (client_tx, client_rx) = mpsc::channel(CLIENT_CHANNEL_CAPACITY);
    let writer = tokio::spawn(write_client_messages(sink, client_rx).in_current_span());

    let transcriber = match start_transcriber(client_tx.clone(), &config).await {
        Ok(transcriber) => transcriber,
        Err(error) => {
            let _ = client_tx.send(ClientMessage::error(error.to_string())).await;
            drop(client_tx);
            let _ = writer.await;
            info!("client disconnected");
            return;
        }
    };

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Binary(audio)) => transcriber.send_audio(audio).await,
            Ok(Message::Text(_)) => debug!("ignoring text frame from client"),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(error) => {
                warn!(error = %error, "client websocket error");
                break;
            }
        }
    }

    transcriber.close().await;
    drop(transcriber);
    drop(client_tx);
    writer.abort();
    info!("client disconnected");
}

async fn start_transcriber(
    client: mpsc::Sender<ClientMessage>,
    config: &TranscriberConfig,
) -> Result<StreamingTranscriber, TranscriberError> {
    let mut transcriber = StreamingTranscriber::new(client, config)?;
    transcriber.start().await?;
    Ok(transcriber)
}

async fn write_client_messages(
    mut sink: SplitSink<WebSocket, Message>,
    mut messages: mpsc::Receiver<ClientMessage>,
) {
    while let Some(message) = messages.recv().await {
        let payload = match message.to_json() {
            Ok(payload) => payload,
            Err(error) => {
                warn!(error = %error, "failed to serialize client message");
                continue;
            }
        };

        if let Err(error) = sink.send(Message::Text(payload.into())).await {
            warn!(error = %error, "failed to send message to client");
            break;
        }
    }

    let _ = sink.close().await;
}
