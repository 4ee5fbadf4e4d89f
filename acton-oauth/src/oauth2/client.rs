//! OAuth2 client core
//!
//! `OAuth2Client` implements the authorization-code grant against a single
//! provider: it builds authorize URLs and performs the token exchange,
//! refresh and revocation calls. It holds only immutable configuration, so
//! one instance can serve any number of concurrent requests; each call owns
//! its own HTTP exchange and nothing is retried internally.

use reqwest::{header, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OAuthError, ProviderPayload};
use crate::oauth2::http::{build_http_client, ProviderResponse};
use crate::oauth2::pkce::{CodeChallengeMethod, PkcePair};
use crate::oauth2::token::OAuth2Token;

/// How client credentials are presented to the token and revocation endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenEndpointAuthMethod {
    /// `client_id` and `client_secret` in the form body
    #[default]
    ClientSecretPost,
    /// HTTP Basic authentication header
    ClientSecretBasic,
}

/// Static description of a client and its provider endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Short provider identifier (e.g. "google")
    pub name: String,
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Scopes requested when the caller supplies none
    pub base_scopes: Vec<String>,
    /// Authorization endpoint
    pub authorize_endpoint: String,
    /// Token endpoint
    pub access_token_endpoint: String,
    /// Refresh endpoint; `None` when the provider cannot refresh
    pub refresh_token_endpoint: Option<String>,
    /// Revocation endpoint; `None` when the provider cannot revoke
    pub revoke_token_endpoint: Option<String>,
    /// Credential presentation for token and refresh calls
    pub token_endpoint_auth_method: TokenEndpointAuthMethod,
    /// Credential presentation for revocation calls
    pub revocation_endpoint_auth_method: TokenEndpointAuthMethod,
}

impl ClientConfig {
    /// Create a configuration; refreshing defaults to the token endpoint
    pub fn new(
        name: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorize_endpoint: impl Into<String>,
        access_token_endpoint: impl Into<String>,
    ) -> Self {
        let access_token_endpoint = access_token_endpoint.into();
        Self {
            name: name.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            base_scopes: Vec::new(),
            authorize_endpoint: authorize_endpoint.into(),
            refresh_token_endpoint: Some(access_token_endpoint.clone()),
            access_token_endpoint,
            revoke_token_endpoint: None,
            token_endpoint_auth_method: TokenEndpointAuthMethod::default(),
            revocation_endpoint_auth_method: TokenEndpointAuthMethod::default(),
        }
    }

    /// Set the default scopes
    #[must_use]
    pub fn with_base_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.base_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Set (or clear) the refresh endpoint
    #[must_use]
    pub fn with_refresh_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.refresh_token_endpoint = endpoint;
        self
    }

    /// Set (or clear) the revocation endpoint
    #[must_use]
    pub fn with_revoke_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.revoke_token_endpoint = endpoint;
        self
    }

    /// Set the credential presentation for token and refresh calls
    #[must_use]
    pub const fn with_token_endpoint_auth_method(
        mut self,
        method: TokenEndpointAuthMethod,
    ) -> Self {
        self.token_endpoint_auth_method = method;
        self
    }

    /// Set the credential presentation for revocation calls
    #[must_use]
    pub const fn with_revocation_endpoint_auth_method(
        mut self,
        method: TokenEndpointAuthMethod,
    ) -> Self {
        self.revocation_endpoint_auth_method = method;
        self
    }
}

/// Parameters of one authorization request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizeParams {
    /// Where the provider sends the user back
    pub redirect_uri: String,
    /// Opaque value echoed back on the callback
    pub state: Option<String>,
    /// Scopes replacing the client's base scopes
    pub scope: Option<Vec<String>>,
    /// PKCE challenge
    pub code_challenge: Option<String>,
    /// PKCE challenge method
    pub code_challenge_method: Option<CodeChallengeMethod>,
    /// Provider-specific parameters; replace standard ones of the same name
    pub extras_params: Vec<(String, String)>,
}

impl AuthorizeParams {
    /// Start an authorization request for `redirect_uri`
    pub fn new(redirect_uri: impl Into<String>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            ..Self::default()
        }
    }

    /// Set the state value
    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Request these scopes instead of the base scopes
    #[must_use]
    pub fn scope<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Set an explicit code challenge
    #[must_use]
    pub fn code_challenge(
        mut self,
        challenge: impl Into<String>,
        method: Option<CodeChallengeMethod>,
    ) -> Self {
        self.code_challenge = Some(challenge.into());
        self.code_challenge_method = method;
        self
    }

    /// Use the challenge half of a PKCE pair
    #[must_use]
    pub fn pkce(self, pair: &PkcePair) -> Self {
        self.code_challenge(pair.challenge.clone(), Some(pair.method))
    }

    /// Add a provider-specific parameter
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras_params.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum TokenGrant {
    AuthorizationCode,
    Refresh,
}

impl TokenGrant {
    fn error(self, status: u16, payload: ProviderPayload) -> OAuthError {
        match self {
            Self::AuthorizationCode => OAuthError::GetAccessToken { status, payload },
            Self::Refresh => OAuthError::RefreshToken { status, payload },
        }
    }
}

/// OAuth2 authorization-code client for one provider
#[derive(Debug, Clone)]
pub struct OAuth2Client {
    config: ClientConfig,
    authorize_endpoint: Url,
    access_token_endpoint: Url,
    refresh_token_endpoint: Option<Url>,
    revoke_token_endpoint: Option<Url>,
    http_client: reqwest::Client,
}

impl OAuth2Client {
    /// Create a client
    ///
    /// # Errors
    ///
    /// Returns `Config` if any endpoint is not a valid absolute URL
    pub fn new(config: ClientConfig) -> Result<Self, OAuthError> {
        let authorize_endpoint = parse_endpoint("authorize", &config.authorize_endpoint)?;
        let access_token_endpoint = parse_endpoint("token", &config.access_token_endpoint)?;
        let refresh_token_endpoint = config
            .refresh_token_endpoint
            .as_deref()
            .map(|url| parse_endpoint("refresh", url))
            .transpose()?;
        let revoke_token_endpoint = config
            .revoke_token_endpoint
            .as_deref()
            .map(|url| parse_endpoint("revoke", url))
            .transpose()?;

        Ok(Self {
            authorize_endpoint,
            access_token_endpoint,
            refresh_token_endpoint,
            revoke_token_endpoint,
            http_client: build_http_client()?,
            config,
        })
    }

    /// Use a caller-owned HTTP client (timeouts, proxies, connection pool)
    #[must_use]
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = http_client;
        self
    }

    /// Short provider identifier
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// OAuth2 client ID
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.config.client_id
    }

    /// Scopes requested when the caller supplies none
    #[must_use]
    pub fn base_scopes(&self) -> &[String] {
        &self.config.base_scopes
    }

    /// Full configuration
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Authorization endpoint
    #[must_use]
    pub const fn authorize_endpoint(&self) -> &Url {
        &self.authorize_endpoint
    }

    /// Token endpoint
    #[must_use]
    pub const fn access_token_endpoint(&self) -> &Url {
        &self.access_token_endpoint
    }

    /// Refresh endpoint, if supported
    #[must_use]
    pub const fn refresh_token_endpoint(&self) -> Option<&Url> {
        self.refresh_token_endpoint.as_ref()
    }

    /// Revocation endpoint, if supported
    #[must_use]
    pub const fn revoke_token_endpoint(&self) -> Option<&Url> {
        self.revoke_token_endpoint.as_ref()
    }

    /// HTTP client shared with provider adapters
    #[must_use]
    pub const fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Build the URL the user agent is sent to
    ///
    /// Pure function of the configuration and `params`: no network call.
    /// Caller scopes replace the base scopes; empty values are omitted and
    /// every parameter appears at most once.
    #[must_use]
    pub fn get_authorization_url(&self, params: &AuthorizeParams) -> String {
        let scope = params
            .scope
            .as_deref()
            .unwrap_or(&self.config.base_scopes)
            .join(" ");

        let mut pairs: Vec<(&str, &str)> = vec![
            ("response_type", "code"),
            ("client_id", self.config.client_id.as_str()),
            ("redirect_uri", params.redirect_uri.as_str()),
            ("scope", scope.as_str()),
        ];
        if let Some(state) = &params.state {
            pairs.push(("state", state.as_str()));
        }
        if let Some(challenge) = &params.code_challenge {
            pairs.push(("code_challenge", challenge.as_str()));
            if let Some(method) = params.code_challenge_method {
                pairs.push(("code_challenge_method", method.as_str()));
            }
        }
        for (key, value) in &params.extras_params {
            if let Some(existing) = pairs.iter_mut().find(|pair| pair.0 == key.as_str()) {
                existing.1 = value.as_str();
            } else {
                pairs.push((key.as_str(), value.as_str()));
            }
        }

        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .extend_pairs(pairs.into_iter().filter(|(_, value)| !value.is_empty()));
        url.into()
    }

    /// Exchange an authorization code for a token
    ///
    /// # Errors
    ///
    /// Returns `GetAccessToken` when the provider rejects the exchange,
    /// `InvalidTokenResponse` for an unusable 2xx body and `Transport` for
    /// network failures
    pub async fn get_access_token(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: Option<&str>,
    ) -> Result<OAuth2Token, OAuthError> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];
        if let Some(verifier) = code_verifier {
            form.push(("code_verifier", verifier));
        }

        tracing::debug!(
            provider = %self.config.name,
            endpoint = %self.access_token_endpoint,
            pkce = code_verifier.is_some(),
            "Exchanging authorization code"
        );

        let response = self
            .post_form(
                &self.access_token_endpoint,
                form,
                self.config.token_endpoint_auth_method,
            )
            .await?;
        self.token_from_response(TokenGrant::AuthorizationCode, response)
    }

    /// Obtain a new token from a refresh token
    ///
    /// # Errors
    ///
    /// Returns `RefreshTokenNotSupported` when the provider has no refresh
    /// endpoint, `RefreshToken` when the provider rejects the request,
    /// `InvalidTokenResponse` for an unusable 2xx body and `Transport` for
    /// network failures
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<OAuth2Token, OAuthError> {
        let endpoint = self
            .refresh_token_endpoint
            .as_ref()
            .ok_or(OAuthError::RefreshTokenNotSupported)?;

        let form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];

        tracing::debug!(
            provider = %self.config.name,
            endpoint = %endpoint,
            "Refreshing access token"
        );

        let response = self
            .post_form(endpoint, form, self.config.token_endpoint_auth_method)
            .await?;
        self.token_from_response(TokenGrant::Refresh, response)
    }

    /// Revoke an access or refresh token
    ///
    /// Revoking an already revoked token is not an error unless the
    /// provider reports one.
    ///
    /// # Errors
    ///
    /// Returns `RevokeTokenNotSupported` when the provider has no revocation
    /// endpoint, `RevokeToken` on a non-2xx answer and `Transport` for
    /// network failures
    pub async fn revoke_token(
        &self,
        token: &str,
        token_type_hint: Option<&str>,
    ) -> Result<(), OAuthError> {
        let endpoint = self
            .revoke_token_endpoint
            .as_ref()
            .ok_or(OAuthError::RevokeTokenNotSupported)?;

        let mut form = vec![("token", token)];
        if let Some(hint) = token_type_hint {
            form.push(("token_type_hint", hint));
        }

        tracing::debug!(
            provider = %self.config.name,
            endpoint = %endpoint,
            "Revoking token"
        );

        let response = self
            .post_form(endpoint, form, self.config.revocation_endpoint_auth_method)
            .await?;

        if !response.is_success() {
            tracing::warn!(
                provider = %self.config.name,
                status = response.status.as_u16(),
                "Token revocation rejected by provider"
            );
            return Err(OAuthError::RevokeToken {
                status: response.status.as_u16(),
                payload: response.payload(),
            });
        }

        Ok(())
    }

    async fn post_form<'a>(
        &'a self,
        endpoint: &Url,
        mut form: Vec<(&'a str, &'a str)>,
        auth_method: TokenEndpointAuthMethod,
    ) -> Result<ProviderResponse, OAuthError> {
        let mut request = self
            .http_client
            .post(endpoint.clone())
            .header(header::ACCEPT, "application/json");

        match auth_method {
            TokenEndpointAuthMethod::ClientSecretPost => {
                form.push(("client_id", self.config.client_id.as_str()));
                form.push(("client_secret", self.config.client_secret.as_str()));
            }
            TokenEndpointAuthMethod::ClientSecretBasic => {
                request =
                    request.basic_auth(&self.config.client_id, Some(&self.config.client_secret));
            }
        }

        let response = request.form(&form).send().await.map_err(|e| {
            tracing::warn!(provider = %self.config.name, error = %e, "Provider unreachable");
            OAuthError::Transport(e)
        })?;
        ProviderResponse::read(response).await
    }

    fn token_from_response(
        &self,
        grant: TokenGrant,
        response: ProviderResponse,
    ) -> Result<OAuth2Token, OAuthError> {
        let status = response.status.as_u16();

        if !response.is_success() {
            tracing::warn!(
                provider = %self.config.name,
                status,
                ?grant,
                "Token request rejected by provider"
            );
            return Err(grant.error(status, response.payload()));
        }

        let map = match response.payload() {
            ProviderPayload::Json(Value::Object(map)) => map,
            other => return Err(OAuthError::InvalidTokenResponse(other)),
        };

        // Some providers (GitHub) report errors with a 200 status
        if map.contains_key("error") {
            tracing::warn!(
                provider = %self.config.name,
                status,
                ?grant,
                "Token request rejected by provider"
            );
            return Err(grant.error(status, ProviderPayload::Json(Value::Object(map))));
        }

        OAuth2Token::from_response(map)
    }
}

/// Parse an endpoint URL, naming it in the error
pub(crate) fn parse_endpoint(label: &str, url: &str) -> Result<Url, OAuthError> {
    Url::parse(url)
        .map_err(|e| OAuthError::Config(format!("Invalid {label} endpoint {url:?}: {e}")))
}
