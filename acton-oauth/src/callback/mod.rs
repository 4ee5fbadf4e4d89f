//! Authorization callback adapter
//!
//! Validates the query parameters a provider sends back to the redirect URI
//! and drives the code exchange. The adapter does not check `state`; it is
//! returned untouched so the caller can compare it with the value it
//! embedded in the authorization URL.
//!
//! Framework integration lives behind [`RouteResolver`]; the `axum` feature
//! provides one for axum applications.

#[cfg(feature = "axum")]
pub mod axum;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::OAuthError;
use crate::oauth2::client::OAuth2Client;
use crate::oauth2::token::OAuth2Token;

/// Query parameters of an authorization response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
    /// Authorization code
    pub code: Option<String>,
    /// PKCE verifier, when the caller round-trips it through the redirect
    pub code_verifier: Option<String>,
    /// State echoed by the provider
    pub state: Option<String>,
    /// Error reported by the provider (e.g. `access_denied`)
    pub error: Option<String>,
}

/// Where the redirect URI of the exchange comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectTarget {
    /// Named route resolved per request
    Route(String),
    /// Fixed URL
    Url(String),
}

/// Callback errors
#[derive(Debug, Error)]
pub enum CallbackError {
    /// Missing code or provider-reported error
    #[error("Bad request: {}", .detail.as_deref().unwrap_or_default())]
    BadRequest {
        /// Provider `error` value, if any
        detail: Option<String>,
    },

    /// Route/redirect configuration is unusable
    #[error("Callback misconfigured: {0}")]
    Misconfigured(String),

    /// Code exchange failed
    #[error(transparent)]
    OAuth(#[from] OAuthError),
}

/// Resolves a named route into an absolute URL
#[cfg_attr(test, mockall::automock)]
pub trait RouteResolver: Send + Sync {
    /// Absolute URL of `route_name`
    ///
    /// # Errors
    ///
    /// Returns `Misconfigured` if the route is unknown
    fn url_for(&self, route_name: &str) -> Result<String, CallbackError>;
}

/// Resolver for callbacks configured with a fixed redirect URL
impl RouteResolver for () {
    fn url_for(&self, route_name: &str) -> Result<String, CallbackError> {
        Err(CallbackError::Misconfigured(format!(
            "No route resolver available for route {route_name:?}"
        )))
    }
}

/// Callback handler bound to one client and redirect target
#[derive(Debug, Clone)]
pub struct AuthorizeCallback {
    client: OAuth2Client,
    target: RedirectTarget,
}

impl AuthorizeCallback {
    /// Create a callback from exactly one of `route_name` and `redirect_url`
    ///
    /// # Errors
    ///
    /// Returns `Misconfigured` when both or neither are set
    pub fn new(
        client: OAuth2Client,
        route_name: Option<String>,
        redirect_url: Option<String>,
    ) -> Result<Self, CallbackError> {
        let target = match (route_name, redirect_url) {
            (Some(route_name), None) => RedirectTarget::Route(route_name),
            (None, Some(redirect_url)) => RedirectTarget::Url(redirect_url),
            (Some(_), Some(_)) => {
                return Err(CallbackError::Misconfigured(
                    "set either route_name or redirect_url, not both".to_string(),
                ))
            }
            (None, None) => {
                return Err(CallbackError::Misconfigured(
                    "either route_name or redirect_url is required".to_string(),
                ))
            }
        };

        Ok(Self { client, target })
    }

    /// Callback redirecting to a named route
    pub fn with_route(client: OAuth2Client, route_name: impl Into<String>) -> Self {
        Self {
            client,
            target: RedirectTarget::Route(route_name.into()),
        }
    }

    /// Callback redirecting to a fixed URL
    pub fn with_redirect_url(client: OAuth2Client, redirect_url: impl Into<String>) -> Self {
        Self {
            client,
            target: RedirectTarget::Url(redirect_url.into()),
        }
    }

    /// Client used for the exchange
    #[must_use]
    pub const fn client(&self) -> &OAuth2Client {
        &self.client
    }

    /// Configured redirect target
    #[must_use]
    pub const fn target(&self) -> &RedirectTarget {
        &self.target
    }

    /// Validate the authorization response and exchange the code
    ///
    /// Returns the token and the untouched `state`.
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` without calling the provider when `code` is
    /// missing or `error` is present, `Misconfigured` when the route cannot
    /// be resolved and `OAuth` when the exchange fails
    pub async fn call<R>(
        &self,
        params: CallbackParams,
        resolver: &R,
    ) -> Result<(OAuth2Token, Option<String>), CallbackError>
    where
        R: RouteResolver + ?Sized,
    {
        if let Some(error) = params.error {
            tracing::warn!(
                provider = %self.client.name(),
                error = %error,
                "Authorization denied by provider"
            );
            return Err(CallbackError::BadRequest { detail: Some(error) });
        }

        let Some(code) = params.code else {
            return Err(CallbackError::BadRequest { detail: None });
        };

        let redirect_url = match &self.target {
            RedirectTarget::Route(route_name) => resolver.url_for(route_name)?,
            RedirectTarget::Url(url) => url.clone(),
        };

        let token = self
            .client
            .get_access_token(&code, &redirect_url, params.code_verifier.as_deref())
            .await?;

        tracing::info!(provider = %self.client.name(), "Authorization code exchanged");

        Ok((token, params.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth2::client::ClientConfig;
    use mockall::predicate::eq;

    fn unreachable_client() -> OAuth2Client {
        OAuth2Client::new(ClientConfig::new(
            "example",
            "id",
            "secret",
            "http://127.0.0.1:1/authorize",
            "http://127.0.0.1:1/token",
        ))
        .unwrap()
    }

    #[test]
    fn test_new_requires_exactly_one_target() {
        let client = unreachable_client();

        assert!(matches!(
            AuthorizeCallback::new(client.clone(), None, None),
            Err(CallbackError::Misconfigured(_))
        ));
        assert!(matches!(
            AuthorizeCallback::new(
                client.clone(),
                Some("callback".to_string()),
                Some("http://localhost/cb".to_string())
            ),
            Err(CallbackError::Misconfigured(_))
        ));

        let callback = AuthorizeCallback::new(client, Some("callback".to_string()), None).unwrap();
        assert_eq!(callback.target(), &RedirectTarget::Route("callback".to_string()));
    }

    #[tokio::test]
    async fn test_missing_code_is_bad_request() {
        let callback =
            AuthorizeCallback::with_redirect_url(unreachable_client(), "http://localhost/cb");
        let result = callback.call(CallbackParams::default(), &()).await;
        assert!(matches!(result, Err(CallbackError::BadRequest { detail: None })));
    }

    #[tokio::test]
    async fn test_provider_error_wins_over_code() {
        let callback =
            AuthorizeCallback::with_redirect_url(unreachable_client(), "http://localhost/cb");
        let params = CallbackParams {
            code: Some("CODE".to_string()),
            error: Some("access_denied".to_string()),
            ..CallbackParams::default()
        };

        match callback.call(params, &()).await {
            Err(CallbackError::BadRequest { detail }) => {
                assert_eq!(detail.as_deref(), Some("access_denied"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_bad_request_never_resolves_route() {
        let mut resolver = MockRouteResolver::new();
        resolver.expect_url_for().never();

        let callback = AuthorizeCallback::with_route(unreachable_client(), "callback");
        let result = callback.call(CallbackParams::default(), &resolver).await;
        assert!(matches!(result, Err(CallbackError::BadRequest { .. })));
    }

    #[tokio::test]
    async fn test_route_is_resolved_before_exchange() {
        let mut resolver = MockRouteResolver::new();
        resolver
            .expect_url_for()
            .with(eq("callback"))
            .times(1)
            .returning(|_| Ok("http://localhost/auth/callback".to_string()));

        let callback = AuthorizeCallback::with_route(unreachable_client(), "callback");
        let params = CallbackParams {
            code: Some("CODE".to_string()),
            ..CallbackParams::default()
        };

        let result = callback.call(params, &resolver).await;
        assert!(matches!(result, Err(CallbackError::OAuth(OAuthError::Transport(_)))));
    }

    #[tokio::test]
    async fn test_unresolvable_route_is_misconfigured() {
        let callback = AuthorizeCallback::with_route(unreachable_client(), "callback");
        let params = CallbackParams {
            code: Some("CODE".to_string()),
            ..CallbackParams::default()
        };

        let result = callback.call(params, &()).await;
        assert!(matches!(result, Err(CallbackError::Misconfigured(_))));
    }

    #[test]
    fn test_bad_request_display() {
        let error = CallbackError::BadRequest {
            detail: Some("access_denied".to_string()),
        };
        assert_eq!(error.to_string(), "Bad request: access_denied");
    }
}
