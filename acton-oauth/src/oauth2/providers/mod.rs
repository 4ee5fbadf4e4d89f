//! OAuth2 provider implementations
//!
//! This module contains implementations for various OAuth2 providers:
//! - Google OAuth2 (People API profile)
//! - GitHub OAuth2
//! - Generic OpenID Connect provider
//!
//! All providers share `BaseProvider` for endpoint overrides and profile
//! requests.

pub mod base;
pub mod github;
pub mod google;
pub mod oidc;

pub use base::BaseProvider;
pub use github::GitHubProvider;
pub use google::{GoogleField, GoogleProvider};
pub use oidc::OidcProvider;

use crate::config::ProviderConfig;
use crate::error::OAuthError;
use crate::oauth2::provider::{OAuth2Provider, ProviderKind};

/// Build the adapter for `kind` from its configuration
///
/// Generic OIDC providers configured with a `discovery_url` fetch their
/// configuration document here.
///
/// # Errors
///
/// Returns the construction error of the selected adapter
pub async fn from_config(
    kind: ProviderKind,
    config: &ProviderConfig,
) -> Result<Box<dyn OAuth2Provider>, OAuthError> {
    let provider: Box<dyn OAuth2Provider> = match kind {
        ProviderKind::Google => Box::new(GoogleProvider::new(config)?),
        ProviderKind::GitHub => Box::new(GitHubProvider::new(config)?),
        ProviderKind::Oidc => Box::new(OidcProvider::new(config).await?),
    };

    tracing::debug!(provider = %kind, "Configured OAuth2 provider");
    Ok(provider)
}
