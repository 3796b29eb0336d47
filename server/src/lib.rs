mod asr;
pub mod cli;
pub mod config;
mod error;
pub mod secrets;
mod server;
mod session;

use anyhow::{Context, Result};

pub use config::{Env, ServerConfig, TranscriberConfig};
pub use error::TranscriberError;
pub use secrets::SecretService;
pub use server::router;
pub use session::streaming_transcriber::StreamingTranscriber;

pub async fn run(config: ServerConfig) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, "listening");

    axum::serve(listener, router(&config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
