//! Token commands (exchange, refresh, revoke)

use std::path::Path;

use acton_oauth::oauth2::ProviderKind;
use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use super::{load_provider, print_json, status, SUCCESS};

/// Exchange an authorization code
#[derive(Debug, Args)]
pub struct ExchangeCommand {
    /// Provider (google, github, oidc)
    pub provider: ProviderKind,

    /// Authorization code from the callback
    #[arg(long)]
    pub code: String,

    /// Redirect URI used for the authorization request
    #[arg(long)]
    pub redirect_uri: String,

    /// PKCE verifier printed by `authorize-url --pkce`
    #[arg(long)]
    pub code_verifier: Option<String>,
}

impl ExchangeCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the code
    pub async fn execute(&self, config_path: &Path) -> Result<()> {
        let provider = load_provider(config_path, self.provider).await?;
        let token = provider
            .client()
            .get_access_token(&self.code, &self.redirect_uri, self.code_verifier.as_deref())
            .await
            .context("Code exchange failed")?;

        status(&SUCCESS, "Authorization code exchanged");
        print_json(&token)
    }
}

/// Refresh a token
#[derive(Debug, Args)]
pub struct RefreshCommand {
    /// Provider (google, github, oidc)
    pub provider: ProviderKind,

    /// Refresh token
    #[arg(long)]
    pub refresh_token: String,
}

impl RefreshCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot refresh or rejects the token
    pub async fn execute(&self, config_path: &Path) -> Result<()> {
        let provider = load_provider(config_path, self.provider).await?;
        let token = provider
            .client()
            .refresh_token(&self.refresh_token)
            .await
            .context("Token refresh failed")?;

        status(&SUCCESS, "Token refreshed");
        print_json(&token)
    }
}

/// Revoke a token
#[derive(Debug, Args)]
pub struct RevokeCommand {
    /// Provider (google, github, oidc)
    pub provider: ProviderKind,

    /// Access or refresh token
    #[arg(long)]
    pub token: String,

    /// Token type hint (access_token or refresh_token)
    #[arg(long)]
    pub hint: Option<String>,
}

impl RevokeCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot revoke or rejects the request
    pub async fn execute(&self, config_path: &Path) -> Result<()> {
        let provider = load_provider(config_path, self.provider).await?;
        provider
            .client()
            .revoke_token(&self.token, self.hint.as_deref())
            .await
            .context("Token revocation failed")?;

        status(&SUCCESS, "Token revoked");
        print_json(&json!({ "revoked": true }))
    }
}
