use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use transcribe_core::{ClientMessage, TranscriberCallbacks};

use crate::{
    asr::assemblyai_client::{self, AssemblyAiSender},
    config::TranscriberConfig,
    error::TranscriberError,
};

/// Capacity of the per-socket queue between the upstream reader and the client writer.
pub const CLIENT_CHANNEL_CAPACITY: usize = 256;

/// One browser socket's AssemblyAI streaming session.
pub struct StreamingTranscriber {
    client: mpsc::Sender<ClientMessage>,
    config: TranscriberConfig,
    api_key: String,
    sender: Option<AssemblyAiSender>,
    running: Arc<AtomicBool>,
}

impl StreamingTranscriber {
    pub fn new(
        client: mpsc::Sender<ClientMessage>,
        config: &TranscriberConfig,
    ) -> Result<Self, TranscriberError> {
        let api_key = config
            .api_key()
            .ok_or(TranscriberError::MissingApiKey)?
            .to_string();

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
            sender: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    pub(crate) fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn start(&mut self) -> Result<(), TranscriberError> {
        if self.sender.is_some() {
            warn!("streaming transcriber already started");
            return Ok(());
        }

        // Raised before connecting so an immediate upstream close is not overwritten.
        self.running.store(true, Ordering::SeqCst);
        match assemblyai_client::connect_live(&self.api_key, &self.config, self.callbacks()).await
        {
            Ok(sender) => {
                self.sender = Some(sender);
                info!(
                    sample_rate = self.sample_rate(),
                    "connected to AssemblyAI universal streaming"
                );
                Ok(())
            }
            Err(error) => {
                self.running.store(false, Ordering::SeqCst);
                error!(error = %error, "failed to start streaming transcriber");
                Err(error)
            }
        }
    }

    /// Forwards audio while the session is live. Failures are logged, not returned.
    pub async fn send_audio(&self, audio: Bytes) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        if !self.is_running() {
            return;
        }

        if let Err(error) = sender.stream(audio).await {
            error!(error = %error, "error sending audio data");
        }
    }

    pub async fn close(&self) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        match sender.close().await {
            Ok(()) => info!("streaming transcriber closed"),
            Err(error) => error!(error = %error, "error closing transcriber"),
        }
    }

    fn callbacks(&self) -> TranscriberCallbacks {
        let data_client = self.client.clone();
        let error_client = self.client.clone();
        let running = self.running.clone();

        TranscriberCallbacks::new()
            .on_open(|opened| {
                info!(
                    session_id = %opened.session_id,
                    expires_at = ?opened.expires_at,
                    "AssemblyAI session started"
                );
            })
            .on_data(move |transcript| {
                if transcript.text.is_empty() {
                    return;
                }

                if transcript.is_final {
                    info!(text = %transcript.text, "transcription");
                } else {
                    info!(text = %transcript.text, "partial transcription");
                }
                relay(
                    &data_client,
                    ClientMessage::transcription(transcript.text.clone(), transcript.is_final),
                );
            })
            .on_error(move |message| {
                error!(error = %message, "AssemblyAI error");
                relay(&error_client, ClientMessage::error(message));
            })
            .on_close(move || {
                info!("AssemblyAI session closed");
                running.store(false, Ordering::SeqCst);
            })
    }
}

fn relay(client: &mpsc::Sender<ClientMessage>, message: ClientMessage) {
    if let Err(error) = client.try_send(message) {
        error!(error = %error, "failed to send message to client");
    }
}
