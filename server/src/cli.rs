use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::config::{
    Env, ServerConfig, TranscriberConfig, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_SAMPLE_RATE,
    SAMPLE_RATE_RANGE,
};
use crate::secrets::DEFAULT_KEYCHAIN_SERVICE;

#[derive(Debug, Parser)]
#[command(name = "live-transcribe", version)]
#[command(about = "Relay browser microphone audio to AssemblyAI and stream transcripts back", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Sample rate of the PCM audio clients send, unless overridden per connection.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_MS)]
    pub connect_timeout_ms: u64,

    /// Report raw end-of-turn transcripts as final instead of waiting for formatting.
    #[arg(long)]
    pub no_format_turns: bool,

    /// Directory served at `/`, e.g. the browser recorder page.
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_KEYCHAIN_SERVICE)]
    pub keychain_service: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save the AssemblyAI API key in the OS keychain.
    StoreKey { key: String },
}

impl Cli {
    pub fn server_config(&self, env: &Env, api_key: Option<String>) -> Result<ServerConfig> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate) {
            bail!(
                "sample rate {} is outside {}..={}",
                self.sample_rate,
                SAMPLE_RATE_RANGE.start(),
                SAMPLE_RATE_RANGE.end()
            );
        }

        let mut transcriber = TranscriberConfig::new(api_key)
            .with_sample_rate(self.sample_rate)
            .with_format_turns(!self.no_format_turns)
            .with_connect_timeout(Duration::from_millis(self.connect_timeout_ms));
        if let Some(url) = env
            .assemblyai_streaming_url
            .as_ref()
            .filter(|url| !url.is_empty())
        {
            transcriber = transcriber.with_streaming_url(url.clone());
        }

        let mut config = ServerConfig::new(SocketAddr::new(self.host, self.port), transcriber);
        if let Some(dir) = &self.static_dir {
            config = config.with_static_dir(dir.clone());
        }
        Ok(config)
    }
}
