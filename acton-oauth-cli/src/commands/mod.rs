//! CLI command implementations

pub mod authorize;
pub mod profile;
pub mod token;

pub use authorize::AuthorizeUrlCommand;
pub use profile::ProfileCommand;
pub use token::{ExchangeCommand, RefreshCommand, RevokeCommand};

use std::path::Path;

use acton_oauth::config::OAuthConfig;
use acton_oauth::oauth2::{from_config, OAuth2Provider, ProviderKind};
use anyhow::{Context, Result};
use console::{style, Emoji};
use serde::Serialize;

pub static SUCCESS: Emoji = Emoji("✓", "√");
pub static INFO: Emoji = Emoji("ℹ", "i");

/// Build the configured provider adapter
///
/// # Errors
///
/// Returns an error if the configuration cannot be read, the provider is
/// not configured or its construction (including OIDC discovery) fails
pub async fn load_provider(
    config_path: &Path,
    kind: ProviderKind,
) -> Result<Box<dyn OAuth2Provider>> {
    let config = OAuthConfig::load_from(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;
    let provider_config = config.get_provider(kind)?;

    from_config(kind, provider_config)
        .await
        .with_context(|| format!("Failed to configure {kind} provider"))
}

/// Print a value as pretty JSON on stdout
///
/// # Errors
///
/// Returns an error if the value cannot be serialized
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a status line on stderr
pub fn status(emoji: &Emoji<'_, '_>, message: &str) {
    eprintln!("{} {}", emoji, style(message).bold());
}
