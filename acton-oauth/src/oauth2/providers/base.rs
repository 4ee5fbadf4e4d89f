//! Shared plumbing for provider adapters
//!
//! `BaseProvider` pairs an [`OAuth2Client`] with the provider's profile
//! endpoint and performs the authenticated profile requests every adapter
//! needs.

use reqwest::Url;
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::{OAuthError, ProviderPayload};
use crate::oauth2::client::{parse_endpoint, ClientConfig, OAuth2Client};
use crate::oauth2::http::ProviderResponse;
use crate::oauth2::provider::ProviderKind;

/// Built-in endpoints and scopes of a provider
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProviderDefaults<'a> {
    pub kind: ProviderKind,
    pub authorize_endpoint: &'a str,
    pub access_token_endpoint: &'a str,
    /// Whether the token endpoint also serves refresh requests
    pub refresh_at_token_endpoint: bool,
    pub revoke_token_endpoint: Option<&'a str>,
    pub profile_endpoint: &'a str,
    pub base_scopes: &'a [&'a str],
}

/// OAuth2 client plus profile endpoint
#[derive(Debug, Clone)]
pub struct BaseProvider {
    client: OAuth2Client,
    profile_url: Url,
}

impl BaseProvider {
    /// Build a provider from defaults, applying configured overrides
    pub(crate) fn new(
        config: &ProviderConfig,
        defaults: ProviderDefaults<'_>,
    ) -> Result<Self, OAuthError> {
        let access_token_endpoint = config
            .token_url
            .clone()
            .unwrap_or_else(|| defaults.access_token_endpoint.to_string());

        let refresh_token_endpoint = config.refresh_url.clone().or_else(|| {
            defaults
                .refresh_at_token_endpoint
                .then(|| access_token_endpoint.clone())
        });

        let revoke_token_endpoint = config
            .revoke_url
            .clone()
            .or_else(|| defaults.revoke_token_endpoint.map(str::to_string));

        let base_scopes = config.scopes.clone().unwrap_or_else(|| {
            defaults
                .base_scopes
                .iter()
                .map(|scope| (*scope).to_string())
                .collect()
        });

        let client_config = ClientConfig::new(
            defaults.kind.as_str(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config
                .auth_url
                .clone()
                .unwrap_or_else(|| defaults.authorize_endpoint.to_string()),
            access_token_endpoint,
        )
        .with_base_scopes(base_scopes)
        .with_refresh_endpoint(refresh_token_endpoint)
        .with_revoke_endpoint(revoke_token_endpoint)
        .with_token_endpoint_auth_method(config.token_endpoint_auth_method)
        .with_revocation_endpoint_auth_method(config.token_endpoint_auth_method);

        let profile_url = config
            .userinfo_url
            .as_deref()
            .unwrap_or(defaults.profile_endpoint);

        Self::from_parts(OAuth2Client::new(client_config)?, profile_url)
    }

    /// Pair an existing client with a profile endpoint
    ///
    /// # Errors
    ///
    /// Returns `Config` if `profile_url` is not a valid absolute URL
    pub fn from_parts(client: OAuth2Client, profile_url: &str) -> Result<Self, OAuthError> {
        Ok(Self {
            profile_url: parse_endpoint("profile", profile_url)?,
            client,
        })
    }

    /// Get reference to the OAuth2 client
    #[must_use]
    pub const fn client(&self) -> &OAuth2Client {
        &self.client
    }

    /// Get reference to the profile URL
    #[must_use]
    pub const fn profile_url(&self) -> &Url {
        &self.profile_url
    }

    /// Fetch the profile endpoint as JSON
    ///
    /// # Errors
    ///
    /// Returns `GetProfile` on a non-2xx answer or a non-JSON body and
    /// `Transport` on network failures
    pub async fn fetch_profile_json(
        &self,
        access_token: &str,
        query: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> Result<Value, OAuthError> {
        let mut url = self.profile_url.clone();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        self.fetch_json_with_headers(url, access_token, headers).await
    }

    /// Fetch JSON from any endpoint of the provider API with extra headers
    ///
    /// # Errors
    ///
    /// Returns `GetProfile` on a non-2xx answer or a non-JSON body and
    /// `Transport` on network failures
    pub async fn fetch_json_with_headers(
        &self,
        url: Url,
        access_token: &str,
        headers: &[(&str, &str)],
    ) -> Result<Value, OAuthError> {
        let mut request = self.client.http_client().get(url).bearer_auth(access_token);
        for (key, value) in headers {
            request = request.header(*key, *value);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(provider = %self.client.name(), error = %e, "Provider unreachable");
            OAuthError::Transport(e)
        })?;
        let response = ProviderResponse::read(response).await?;
        let status = response.status.as_u16();

        if !response.is_success() {
            tracing::warn!(
                provider = %self.client.name(),
                status,
                "Profile request rejected by provider"
            );
            return Err(OAuthError::GetProfile {
                status,
                payload: response.payload(),
            });
        }

        match response.payload() {
            ProviderPayload::Json(value) => Ok(value),
            payload @ ProviderPayload::Text(_) => Err(OAuthError::GetProfile { status, payload }),
        }
    }
}
