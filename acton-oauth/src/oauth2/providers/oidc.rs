//! Generic OpenID Connect provider implementation
//!
//! Works with any OpenID Connect compliant identity provider (Okta, Auth0,
//! Keycloak, etc.), either through discovery of the
//! `.well-known/openid-configuration` document or from manually configured
//! endpoints.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::base::{BaseProvider, ProviderDefaults};
use crate::config::ProviderConfig;
use crate::error::{OAuthError, ProviderPayload};
use crate::oauth2::client::{parse_endpoint, OAuth2Client};
use crate::oauth2::http::{build_http_client, ProviderResponse};
use crate::oauth2::provider::{copy_field, OAuth2Provider, ProviderKind, ProviderProfile};

/// Scopes requested by default
pub const BASE_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Subset of the OpenID provider metadata used to configure the client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderMetadata {
    /// Issuer identifier
    pub issuer: Option<String>,
    /// Authorization endpoint
    pub authorization_endpoint: String,
    /// Token endpoint
    pub token_endpoint: String,
    /// Userinfo endpoint
    pub userinfo_endpoint: Option<String>,
    /// Revocation endpoint (RFC 7009)
    pub revocation_endpoint: Option<String>,
}

/// Generic OpenID Connect provider
#[derive(Debug, Clone)]
pub struct OidcProvider {
    base: BaseProvider,
}

impl OidcProvider {
    /// Create a generic OIDC provider
    ///
    /// Uses discovery when `discovery_url` is configured, otherwise the
    /// manually configured `auth_url`, `token_url` and `userinfo_url`.
    ///
    /// # Errors
    ///
    /// Returns `Discovery` if the configuration document cannot be loaded,
    /// `Config` if required endpoints are missing or invalid
    pub async fn new(config: &ProviderConfig) -> Result<Self, OAuthError> {
        match &config.discovery_url {
            Some(discovery_url) => Self::discover(config, discovery_url).await,
            None => Self::manual(config),
        }
    }

    /// Discover OIDC configuration from the provider
    ///
    /// Configured endpoint overrides take precedence over discovered ones.
    ///
    /// # Errors
    ///
    /// Returns `Discovery` if the document cannot be fetched or parsed or
    /// lacks a userinfo endpoint, `Transport` on network failures
    pub async fn discover(
        config: &ProviderConfig,
        discovery_url: &str,
    ) -> Result<Self, OAuthError> {
        let url = parse_endpoint("discovery", discovery_url)?;

        tracing::debug!(provider = "oidc", url = %url, "Fetching OpenID configuration");

        let response = build_http_client()?
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let response = ProviderResponse::read(response).await?;

        if !response.is_success() {
            tracing::warn!(
                provider = "oidc",
                status = response.status.as_u16(),
                "OpenID configuration request failed"
            );
            return Err(OAuthError::Discovery(format!(
                "HTTP {} from {discovery_url}",
                response.status
            )));
        }

        let metadata: ProviderMetadata = serde_json::from_str(&response.body)
            .map_err(|e| OAuthError::Discovery(format!("Invalid OpenID configuration: {e}")))?;

        let userinfo_endpoint = config
            .userinfo_url
            .as_deref()
            .or(metadata.userinfo_endpoint.as_deref())
            .ok_or_else(|| OAuthError::Discovery("Provider has no userinfo endpoint".to_string()))?;

        let base = BaseProvider::new(
            config,
            ProviderDefaults {
                kind: ProviderKind::Oidc,
                authorize_endpoint: &metadata.authorization_endpoint,
                access_token_endpoint: &metadata.token_endpoint,
                refresh_at_token_endpoint: true,
                revoke_token_endpoint: metadata.revocation_endpoint.as_deref(),
                profile_endpoint: userinfo_endpoint,
                base_scopes: &BASE_SCOPES,
            },
        )?;

        tracing::info!(
            provider = "oidc",
            issuer = metadata.issuer.as_deref().unwrap_or_default(),
            "Discovered OpenID provider"
        );

        Ok(Self { base })
    }

    /// Manual OIDC configuration (no discovery)
    ///
    /// # Errors
    ///
    /// Returns `Config` if `auth_url`, `token_url` or `userinfo_url` is
    /// missing or invalid
    pub fn manual(config: &ProviderConfig) -> Result<Self, OAuthError> {
        let required = |value: &Option<String>, name: &str| {
            value
                .clone()
                .ok_or_else(|| OAuthError::Config(format!("{name} required for OIDC")))
        };
        let auth_url = required(&config.auth_url, "auth_url")?;
        let token_url = required(&config.token_url, "token_url")?;
        let userinfo_url = required(&config.userinfo_url, "userinfo_url")?;

        let base = BaseProvider::new(
            config,
            ProviderDefaults {
                kind: ProviderKind::Oidc,
                authorize_endpoint: &auth_url,
                access_token_endpoint: &token_url,
                refresh_at_token_endpoint: true,
                revoke_token_endpoint: None,
                profile_endpoint: &userinfo_url,
                base_scopes: &BASE_SCOPES,
            },
        )?;

        Ok(Self { base })
    }
}

#[async_trait]
impl OAuth2Provider for OidcProvider {
    fn client(&self) -> &OAuth2Client {
        self.base.client()
    }

    async fn get_profile(&self, access_token: &str) -> Result<Value, OAuthError> {
        self.base.fetch_profile_json(access_token, &[], &[]).await
    }

    async fn get_id_email(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let claims = self
            .get_profile(access_token)
            .await
            .map_err(OAuthError::into_id_email)?;

        let subject = claims.get("sub").and_then(Value::as_str).map(str::to_string);
        let Some(user_id) = subject else {
            tracing::warn!(provider = "oidc", "Userinfo response has no sub claim");
            return Err(OAuthError::GetIdEmail {
                status: 200,
                payload: ProviderPayload::Json(claims),
            });
        };

        let user_email = claims.get("email").and_then(Value::as_str).map(str::to_string);

        let mut extra_data = Map::new();
        for key in ["name", "picture", "email_verified"] {
            copy_field(&mut extra_data, key, Some(&claims), key);
        }

        Ok(ProviderProfile {
            user_id,
            user_email,
            extra_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    fn manual_config() -> ProviderConfig {
        let mut config = ProviderConfig::new("id", "secret");
        config.auth_url = Some("https://auth.example.com/authorize".to_string());
        config.token_url = Some("https://auth.example.com/token".to_string());
        config.userinfo_url = Some("https://auth.example.com/userinfo".to_string());
        config
    }

    #[test]
    fn test_manual_configuration() {
        let provider = OidcProvider::manual(&manual_config()).unwrap();
        let client = provider.client();

        assert_eq!(provider.name(), "oidc");
        assert_eq!(client.authorize_endpoint().as_str(), "https://auth.example.com/authorize");
        assert_eq!(
            client.refresh_token_endpoint().map(Url::as_str),
            Some("https://auth.example.com/token")
        );
        assert!(client.revoke_token_endpoint().is_none());
        assert_eq!(client.base_scopes(), BASE_SCOPES);
    }

    #[test]
    fn test_manual_configuration_requires_endpoints() {
        let mut config = manual_config();
        config.token_url = None;

        assert!(matches!(
            OidcProvider::manual(&config),
            Err(OAuthError::Config(message)) if message.contains("token_url")
        ));
    }

    #[test]
    fn test_metadata_deserialization() {
        let metadata: ProviderMetadata = serde_json::from_str(
            r#"{
                "issuer": "https://auth.example.com",
                "authorization_endpoint": "https://auth.example.com/authorize",
                "token_endpoint": "https://auth.example.com/token",
                "jwks_uri": "https://auth.example.com/jwks"
            }"#,
        )
        .unwrap();

        assert_eq!(metadata.issuer.as_deref(), Some("https://auth.example.com"));
        assert!(metadata.userinfo_endpoint.is_none());
        assert!(metadata.revocation_endpoint.is_none());
    }
}
