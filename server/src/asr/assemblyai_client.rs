use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{
    http::Uri, protocol::frame::coding::CloseCode, ClientRequestBuilder, Message,
};
use transcribe_core::{
    parse_upstream_message, TranscriberCallbacks, UpstreamEvent, TERMINATE_MESSAGE,
};

use crate::{config::TranscriberConfig, error::TranscriberError};

type AssemblyAiWsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type AssemblyAiWriteHalf = futures_util::stream::SplitSink<AssemblyAiWsStream, Message>;
type AssemblyAiReadHalf = futures_util::stream::SplitStream<AssemblyAiWsStream>;

#[derive(Clone)]
pub struct AssemblyAiSender {
    write: Arc<Mutex<AssemblyAiWriteHalf>>,
    terminated: Arc<AtomicBool>,
}

impl AssemblyAiSender {
    /// Sends one chunk of PCM audio exactly as received.
    pub async fn stream(&self, audio: Bytes) -> Result<(), TranscriberError> {
        let mut write = self.write.lock().await;
        write
            .send(Message::Binary(audio))
            .await
            .map_err(TranscriberError::Send)
    }

    /// Asks the service to flush and end the session. Only the first call sends.
    pub async fn close(&self) -> Result<(), TranscriberError> {
        if self.terminated.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let mut write = self.write.lock().await;
        write
            .send(Message::text(TERMINATE_MESSAGE.to_string()))
            .await
            .map_err(TranscriberError::Send)
    }
}

pub fn streaming_url(base: &str, sample_rate: u32, format_turns: bool) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!(
        "{base}{separator}sample_rate={sample_rate}&encoding=pcm_s16le&format_turns={format_turns}"
    )
}

pub async fn connect_live(
    api_key: &str,
    config: &TranscriberConfig,
    callbacks: TranscriberCallbacks,
) -> Result<AssemblyAiSender, TranscriberError> {
    let url = streaming_url(&config.streaming_url, config.sample_rate, config.format_turns);
    let uri = url
        .parse::<Uri>()
        .map_err(|error| TranscriberError::InvalidUrl {
            url: config.streaming_url.clone(),
            reason: error.to_string(),
        })?;
    let request = ClientRequestBuilder::new(uri).with_header("Authorization", api_key);

    let (stream, _) = tokio::time::timeout(
        config.connect_timeout,
        tokio_tungstenite::connect_async(request),
    )
    .await
    .map_err(|_| TranscriberError::ConnectTimeout(config.connect_timeout))?
    .map_err(TranscriberError::Connect)?;

    let (write, read) = stream.split();
    spawn_reader(read, callbacks, config.format_turns);

    Ok(AssemblyAiSender {
        write: Arc::new(Mutex::new(write)),
        terminated: Arc::new(AtomicBool::new(false)),
    })
}

fn spawn_reader(mut read: AssemblyAiReadHalf, callbacks: TranscriberCallbacks, format_turns: bool) {
    tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match parse_upstream_message(text.as_str(), format_turns) {
                        Some(UpstreamEvent::Terminated(terminated)) => {
                            tracing::info!(
                                audio_duration_seconds = ?terminated.audio_duration_seconds,
                                session_duration_seconds = ?terminated.session_duration_seconds,
                                "assemblyai_session_terminated"
                            );
                        }
                        Some(event) => callbacks.dispatch(&event),
                        None => tracing::debug!(payload = %text.as_str(), "assemblyai_message_ignored"),
                    }
                }
                Ok(Message::Close(frame)) => {
                    if let Some(frame) = frame {
                        if frame.code != CloseCode::Normal {
                            callbacks.error(&close_reason(frame.code, frame.reason.as_str()));
                        }
                    }
                    break;
                }
                Ok(_) => {}
                Err(error) => {
                    callbacks.error(&error.to_string());
                    break;
                }
            }
        }

        callbacks.close();
    });
}

fn close_reason(code: CloseCode, reason: &str) -> String {
    let code = u16::from(code);
    if reason.is_empty() {
        format!("connection closed with code {code}")
    } else {
        format!("{reason} (code {code})")
    }
}
