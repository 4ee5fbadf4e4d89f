//! Shared HTTP plumbing for the client core and provider adapters
//!
//! Every provider call goes through the same `reqwest::Client` settings and
//! reads the body exactly once, so error payloads can be surfaced verbatim.

use reqwest::StatusCode;

use crate::error::{OAuthError, ProviderPayload};

/// Build the HTTP client used when the caller does not inject one
///
/// Redirects are disabled: token and revocation endpoints must answer
/// directly, and following a redirect could leak credentials.
///
/// # Errors
///
/// Returns `Config` if the TLS backend cannot be initialized
pub fn build_http_client() -> Result<reqwest::Client, OAuthError> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("acton-oauth/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| OAuthError::Config(format!("Failed to build HTTP client: {e}")))
}

/// Fully buffered provider response
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Raw body
    pub body: String,
}

impl ProviderResponse {
    /// Buffer a response
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the body cannot be read
    pub async fn read(response: reqwest::Response) -> Result<Self, OAuthError> {
        let status = response.status();
        let body = response.text().await?;
        Ok(Self { status, body })
    }

    /// Whether the status is 2xx
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as a provider payload
    #[must_use]
    pub fn payload(&self) -> ProviderPayload {
        ProviderPayload::from_body(&self.body)
    }
}
