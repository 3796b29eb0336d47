use anyhow::Result;
use clap::Parser;
use live_transcribe_lib::{
    cli::{Cli, Command},
    Env, SecretService,
};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    let cli = Cli::parse();
    let env = Env::from_env()?;
    let secrets = SecretService::new(cli.keychain_service.clone());

    if let Some(Command::StoreKey { key }) = &cli.command {
        secrets.save_api_key(key)?;
        tracing::info!(service = %cli.keychain_service, "AssemblyAI API key saved to keychain");
        return Ok(());
    }

    let api_key = secrets.resolve_api_key(env.assemblyai_api_key.as_deref());
    if api_key.is_none() {
        tracing::error!("assemblyai_api_key_not_configured");
    }

    let config = cli.server_config(&env, api_key)?;
    live_transcribe_lib::run(config).await
}
