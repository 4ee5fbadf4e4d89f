//! Authorization URL command

use std::path::Path;

use acton_oauth::oauth2::{generate_state, AuthorizeParams, PkcePair, ProviderKind};
use anyhow::Result;
use clap::Args;
use serde_json::json;

use super::{load_provider, print_json, status, INFO};

/// Print an authorization URL
#[derive(Debug, Args)]
pub struct AuthorizeUrlCommand {
    /// Provider (google, github, oidc)
    pub provider: ProviderKind,

    /// Redirect URI registered with the provider
    #[arg(long)]
    pub redirect_uri: String,

    /// State value (random when omitted)
    #[arg(long)]
    pub state: Option<String>,

    /// Add an S256 PKCE challenge and print the verifier
    #[arg(long)]
    pub pkce: bool,

    /// Scope replacing the provider's base scopes (repeatable)
    #[arg(long)]
    pub scope: Vec<String>,

    /// Provider-specific parameter as key=value (repeatable)
    #[arg(long, value_parser = parse_key_value)]
    pub extra: Vec<(String, String)>,
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
    input
        .split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got {input:?}"))
}

impl AuthorizeUrlCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be configured
    pub async fn execute(&self, config_path: &Path) -> Result<()> {
        let provider = load_provider(config_path, self.provider).await?;

        let state = self.state.clone().unwrap_or_else(generate_state);
        let mut params = AuthorizeParams::new(&self.redirect_uri).state(&state);
        if !self.scope.is_empty() {
            params = params.scope(self.scope.iter().cloned());
        }
        for (key, value) in &self.extra {
            params = params.extra(key, value);
        }

        let pkce = self.pkce.then(PkcePair::generate);
        if let Some(pair) = &pkce {
            params = params.pkce(pair);
        }

        let url = provider.client().get_authorization_url(&params);

        status(&INFO, &format!("Open this URL to authorize with {}", provider.name()));
        print_json(&json!({
            "url": url,
            "state": state,
            "code_verifier": pkce.map(|pair| pair.verifier),
        }))
    }
}
