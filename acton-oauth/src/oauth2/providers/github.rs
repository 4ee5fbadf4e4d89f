//! GitHub OAuth2 provider implementation
//!
//! GitHub omits `email` from the user profile when the user keeps it
//! private; the primary address is then read from `/user/emails`.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value};

use super::base::{BaseProvider, ProviderDefaults};
use crate::config::ProviderConfig;
use crate::error::{OAuthError, ProviderPayload};
use crate::oauth2::client::{parse_endpoint, OAuth2Client};
use crate::oauth2::provider::{
    copy_field, primary_entry, OAuth2Provider, ProviderKind, ProviderProfile,
};

/// Authorization endpoint
pub const AUTHORIZE_ENDPOINT: &str = "https://github.com/login/oauth/authorize";
/// Token endpoint, also used for refresh
pub const ACCESS_TOKEN_ENDPOINT: &str = "https://github.com/login/oauth/access_token";
/// User profile endpoint
pub const PROFILE_ENDPOINT: &str = "https://api.github.com/user";
/// Scopes requested by default
pub const BASE_SCOPES: [&str; 2] = ["user", "user:email"];

const API_HEADERS: [(&str, &str); 3] = [
    ("Accept", "application/vnd.github+json"),
    ("User-Agent", concat!("acton-oauth/", env!("CARGO_PKG_VERSION"))),
    ("X-GitHub-Api-Version", "2022-11-28"),
];

/// GitHub OAuth2 provider
#[derive(Debug, Clone)]
pub struct GitHubProvider {
    base: BaseProvider,
    emails_url: Url,
}

impl GitHubProvider {
    /// Create a new GitHub OAuth2 provider
    ///
    /// GitHub has no revocation endpoint usable with client credentials, so
    /// `revoke_token` fails with `RevokeTokenNotSupported` unless
    /// `revoke_url` is configured.
    ///
    /// # Errors
    ///
    /// Returns `Config` if an endpoint override is not a valid URL
    pub fn new(config: &ProviderConfig) -> Result<Self, OAuthError> {
        let base = BaseProvider::new(
            config,
            ProviderDefaults {
                kind: ProviderKind::GitHub,
                authorize_endpoint: AUTHORIZE_ENDPOINT,
                access_token_endpoint: ACCESS_TOKEN_ENDPOINT,
                refresh_at_token_endpoint: true,
                revoke_token_endpoint: None,
                profile_endpoint: PROFILE_ENDPOINT,
                base_scopes: &BASE_SCOPES,
            },
        )?;

        let emails_url = format!("{}/emails", base.profile_url().as_str().trim_end_matches('/'));
        let emails_url = parse_endpoint("emails", &emails_url)?;

        Ok(Self { base, emails_url })
    }

    /// Endpoint listing the user's email addresses
    #[must_use]
    pub const fn emails_url(&self) -> &Url {
        &self.emails_url
    }

    async fn primary_email(&self, access_token: &str) -> Result<Option<String>, OAuthError> {
        let emails = self
            .base
            .fetch_json_with_headers(self.emails_url.clone(), access_token, &API_HEADERS)
            .await?;

        let entries = emails.as_array().map(Vec::as_slice).unwrap_or_default();
        Ok(primary_entry(entries, "/primary")
            .and_then(|entry| entry.get("email"))
            .and_then(Value::as_str)
            .map(str::to_string))
    }
}

fn user_id(profile: &Value) -> Option<String> {
    match profile.get("id")? {
        Value::Number(id) => Some(id.to_string()),
        Value::String(id) => Some(id.clone()),
        _ => None,
    }
}

#[async_trait]
impl OAuth2Provider for GitHubProvider {
    fn client(&self) -> &OAuth2Client {
        self.base.client()
    }

    async fn get_profile(&self, access_token: &str) -> Result<Value, OAuthError> {
        self.base
            .fetch_profile_json(access_token, &[], &API_HEADERS)
            .await
    }

    async fn get_id_email(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let profile = self
            .get_profile(access_token)
            .await
            .map_err(OAuthError::into_id_email)?;

        let Some(user_id) = user_id(&profile) else {
            tracing::warn!(provider = "github", "Profile has no id");
            return Err(OAuthError::GetIdEmail {
                status: 200,
                payload: ProviderPayload::Json(profile),
            });
        };

        let user_email = match profile.get("email").and_then(Value::as_str) {
            Some(email) => Some(email.to_string()),
            None => self
                .primary_email(access_token)
                .await
                .map_err(OAuthError::into_id_email)?,
        };

        let mut extra_data = Map::new();
        for key in ["login", "name", "avatar_url"] {
            copy_field(&mut extra_data, key, Some(&profile), key);
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
    use serde_json::json;

    #[test]
    fn test_github_provider_defaults() {
        let provider = GitHubProvider::new(&ProviderConfig::new("id", "secret")).unwrap();
        let client = provider.client();

        assert_eq!(provider.name(), "github");
        assert_eq!(client.authorize_endpoint().as_str(), AUTHORIZE_ENDPOINT);
        assert_eq!(client.base_scopes(), BASE_SCOPES);
        assert!(client.revoke_token_endpoint().is_none());
        assert_eq!(provider.emails_url().as_str(), "https://api.github.com/user/emails");
    }

    #[test]
    fn test_emails_url_follows_profile_override() {
        let mut config = ProviderConfig::new("id", "secret");
        config.userinfo_url = Some("http://127.0.0.1:8080/api/v3/user/".to_string());

        let provider = GitHubProvider::new(&config).unwrap();
        assert_eq!(provider.emails_url().as_str(), "http://127.0.0.1:8080/api/v3/user/emails");
    }

    #[test]
    fn test_user_id_formats() {
        assert_eq!(user_id(&json!({"id": 583_231})), Some("583231".to_string()));
        assert_eq!(user_id(&json!({"id": "MDQ6VXNlcjE="})), Some("MDQ6VXNlcjE=".to_string()));
        assert_eq!(user_id(&json!({"login": "octocat"})), None);
    }
}
