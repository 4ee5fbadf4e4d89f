//! acton-oauth CLI tool

mod commands;

use std::path::PathBuf;

use acton_oauth::observability::{self, ObservabilityConfig};
use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{
    AuthorizeUrlCommand, ExchangeCommand, ProfileCommand, RefreshCommand, RevokeCommand,
};

#[derive(Debug, Parser)]
#[command(name = "acton-oauth")]
#[command(version)]
#[command(about = "Exercise OAuth2 providers from the terminal", long_about = None)]
struct Cli {
    /// Provider configuration file
    #[arg(short, long, global = true, default_value = "oauth.toml")]
    config: PathBuf,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print an authorization URL (with state and optional PKCE verifier)
    AuthorizeUrl(AuthorizeUrlCommand),
    /// Exchange an authorization code for a token
    Exchange(ExchangeCommand),
    /// Obtain a new token from a refresh token
    Refresh(RefreshCommand),
    /// Revoke an access or refresh token
    Revoke(RevokeCommand),
    /// Fetch the normalized (or raw) user profile
    Profile(ProfileCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    observability::init_with(&ObservabilityConfig::default().with_default_filter(cli.log.clone()))?;

    match &cli.command {
        Commands::AuthorizeUrl(cmd) => cmd.execute(&cli.config).await?,
        Commands::Exchange(cmd) => cmd.execute(&cli.config).await?,
        Commands::Refresh(cmd) => cmd.execute(&cli.config).await?,
        Commands::Revoke(cmd) => cmd.execute(&cli.config).await?,
        Commands::Profile(cmd) => cmd.execute(&cli.config).await?,
    }

    Ok(())
}
