use std::time::Duration;

use tokio_tungstenite::tungstenite;

#[derive(Debug, thiserror::Error)]
pub enum TranscriberError {
    #[error("AssemblyAI API key not configured")]
    MissingApiKey,
    #[error("invalid streaming url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("timed out after {0:?} connecting to AssemblyAI")]
    ConnectTimeout(Duration),
    #[error("failed to open AssemblyAI websocket: {0}")]
    Connect(#[source] tungstenite::Error),
    #[error("failed to send to AssemblyAI: {0}")]
    Send(#[source] tungstenite::Error),
}
