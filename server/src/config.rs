use std::{net::SocketAddr, ops::RangeInclusive, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_STREAMING_URL: &str = "wss://streaming.assemblyai.com/v3/ws";
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 7 * 1000;
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8_000..=48_000;

#[derive(Debug, Default, Deserialize)]
pub struct Env {
    #[serde(default)]
    pub assemblyai_api_key: Option<String>,
    #[serde(default)]
    pub assemblyai_streaming_url: Option<String>,
}

impl Env {
    pub fn from_env() -> Result<Self> {
        envy::from_env::<Env>().context("failed to read environment")
    }
}

/// Settings for one upstream streaming session. Cloned per browser socket.
#[derive(Clone)]
pub struct TranscriberConfig {
    pub api_key: Option<String>,
    pub streaming_url: String,
    pub sample_rate: u32,
    pub format_turns: bool,
    pub connect_timeout: Duration,
}

impl TranscriberConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            streaming_url: DEFAULT_STREAMING_URL.to_string(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            format_turns: true,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }

    pub fn with_streaming_url(mut self, url: impl Into<String>) -> Self {
        self.streaming_url = url.into();
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_format_turns(mut self, format_turns: bool) -> Self {
        self.format_turns = format_turns;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// The configured key, treating an empty string as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }
}

#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
    pub transcriber: TranscriberConfig,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr, transcriber: TranscriberConfig) -> Self {
        Self {
            bind_addr,
            static_dir: None,
            transcriber,
        }
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }
}
