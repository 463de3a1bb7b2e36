use anyhow::Context;
use canburn_core::{Config, ProviderId};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use tracing::info;

use crate::{
    app::{AppState, router},
    logging::{LoggingConfig, init_logging},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "canburn", version, about = "Can I Burn API server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Bind address; overrides config and HOST.
        #[arg(long)]
        host: Option<String>,

        /// Listen port; overrides config and PORT.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Store credentials for a geocoding provider.
    Configure {
        /// Provider short name, e.g. "locationiq".
        provider: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { host, port } => serve(host, port).await,
            Command::Configure { provider } => configure(&provider),
        }
    }
}

async fn serve(host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    init_logging(&LoggingConfig::from_env());

    let mut config = Config::load()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let state = AppState::from_config(&config)?;
    let geocoders: Vec<_> = state.geocoder().providers().iter().map(|p| p.id().as_str()).collect();

    info!(
        fire_service = %config.fire_service.base_url,
        region = %config.fire_service.region,
        geocoders = ?geocoders,
        "configuration loaded"
    );

    let bind = (config.server.host.as_str(), config.server.port);
    let listener = tokio::net::TcpListener::bind(bind).await.with_context(|| {
        format!("Failed to bind {}:{}", config.server.host, config.server.port)
    })?;
    let addr = listener.local_addr()?;

    info!(addr = %addr, "Can I Burn API listening");

    axum::serve(listener, router(state)).with_graceful_shutdown(shutdown_signal()).await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    if !id.requires_api_key() {
        println!("Provider '{id}' needs no credentials; nothing to configure.");
        return Ok(());
    }

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;

    let api_key = api_key.trim().to_string();
    if api_key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    let mut config = Config::load_file()?;
    config.upsert_provider_api_key(id, api_key);
    config.save()?;

    println!("Saved credentials for '{id}' to {}", Config::config_file_path()?.display());
    Ok(())
}
