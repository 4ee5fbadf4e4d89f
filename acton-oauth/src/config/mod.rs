//! Configuration management for acton-oauth
//!
//! Provider credentials and endpoint overrides are loaded with figment from
//! two sources, highest priority first:
//!
//! 1. Environment variables (`ACTON_` prefix, `__` separates nesting, e.g.
//!    `ACTON_OAUTH2__GOOGLE__CLIENT_SECRET`)
//! 2. A TOML file (by convention `./oauth.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [oauth2.google]
//! client_id = "your-google-client-id"
//! client_secret = "your-google-client-secret"
//! fields = ["id", "email", "first_name", "last_name", "picture"]
//!
//! [oauth2.github]
//! client_id = "your-github-client-id"
//! client_secret = "your-github-client-secret"
//! scopes = ["read:user", "user:email"]
//!
//! [oauth2.oidc]
//! client_id = "your-client-id"
//! client_secret = "your-client-secret"
//! discovery_url = "https://auth.example.com/.well-known/openid-configuration"
//! ```
//!
//! Configuration is read once; providers built from it never observe later
//! changes.

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::OAuthError;
use crate::oauth2::client::TokenEndpointAuthMethod;
use crate::oauth2::provider::ProviderKind;

/// Configuration for an OAuth2 provider
///
/// Endpoint fields are optional overrides of the provider defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Scopes replacing the provider's base scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    /// Profile attributes to request (provider-specific names)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    /// Authorization endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    /// Token endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    /// Refresh endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    /// Revocation endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoke_url: Option<String>,
    /// Profile (userinfo) endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_url: Option<String>,
    /// OpenID configuration document (generic OIDC only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_url: Option<String>,
    /// Credential presentation to the token endpoint
    #[serde(default)]
    pub token_endpoint_auth_method: TokenEndpointAuthMethod,
}

impl ProviderConfig {
    /// Create a configuration with credentials and provider defaults
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Request these profile attributes
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the provider's base scopes
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }
}

/// Complete OAuth2 configuration for all providers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Google OAuth2 configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<ProviderConfig>,
    /// GitHub OAuth2 configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<ProviderConfig>,
    /// Generic OIDC configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc: Option<ProviderConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    oauth2: OAuthConfig,
}

impl OAuthConfig {
    /// Create a new empty OAuth2 configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            google: None,
            github: None,
            oidc: None,
        }
    }

    /// Load the `[oauth2]` section from a TOML file, with `ACTON_`
    /// environment variables taking precedence
    ///
    /// A missing file is not an error; the environment alone may configure
    /// providers.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the file or environment holds invalid values
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, OAuthError> {
        let file: ConfigFile = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("ACTON_").split("__"))
            .extract()
            .map_err(|e| OAuthError::Config(e.to_string()))?;

        tracing::debug!(
            path = %path.as_ref().display(),
            google = file.oauth2.google.is_some(),
            github = file.oauth2.github.is_some(),
            oidc = file.oauth2.oidc.is_some(),
            "Loaded OAuth2 configuration"
        );

        Ok(file.oauth2)
    }

    const fn provider_config(&self, provider: ProviderKind) -> Option<&ProviderConfig> {
        match provider {
            ProviderKind::Google => self.google.as_ref(),
            ProviderKind::GitHub => self.github.as_ref(),
            ProviderKind::Oidc => self.oidc.as_ref(),
        }
    }

    /// Get configuration for a specific provider
    ///
    /// # Errors
    ///
    /// Returns error if the provider is not configured
    pub fn get_provider(&self, provider: ProviderKind) -> Result<&ProviderConfig, OAuthError> {
        self.provider_config(provider)
            .ok_or(OAuthError::ProviderNotConfigured(provider))
    }

    /// Check if a provider is configured
    #[must_use]
    pub const fn is_provider_configured(&self, provider: ProviderKind) -> bool {
        self.provider_config(provider).is_some()
    }
}
