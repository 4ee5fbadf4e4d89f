//! Error types and error handling
//!
//! Every failure a provider signals is surfaced with the untouched response
//! body so callers can inspect provider-specific diagnostics. Transport
//! failures (DNS, TLS, connection resets) are kept distinct from errors the
//! provider itself reported.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::oauth2::provider::ProviderKind;

/// Raw body returned by a provider alongside a failure
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPayload {
    /// Body parsed as JSON
    Json(Value),
    /// Body that was not valid JSON, kept verbatim
    Text(String),
}

impl ProviderPayload {
    /// Parse a response body, keeping it as text when it is not JSON
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).map_or_else(|_| Self::Text(body.to_string()), Self::Json)
    }

    /// The payload as JSON, if it parsed
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(_) => None,
        }
    }

    /// Look up a top-level key of a JSON object payload
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_json().and_then(|value| value.get(key))
    }
}

impl fmt::Display for ProviderPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// OAuth2 errors
#[derive(Debug, Error)]
pub enum OAuthError {
    /// Token endpoint answered 2xx but the body is not a usable token
    #[error("Invalid token response: {0}")]
    InvalidTokenResponse(ProviderPayload),

    /// Authorization code exchange rejected by the provider
    #[error("Failed to exchange authorization code for token (HTTP {status}): {payload}")]
    GetAccessToken {
        /// HTTP status of the token endpoint response
        status: u16,
        /// Raw provider body
        payload: ProviderPayload,
    },

    /// Refresh rejected by the provider
    #[error("Failed to refresh token (HTTP {status}): {payload}")]
    RefreshToken {
        /// HTTP status of the refresh endpoint response
        status: u16,
        /// Raw provider body
        payload: ProviderPayload,
    },

    /// Revocation rejected by the provider
    #[error("Failed to revoke token (HTTP {status}): {payload}")]
    RevokeToken {
        /// HTTP status of the revocation endpoint response
        status: u16,
        /// Raw provider body
        payload: ProviderPayload,
    },

    /// Profile endpoint rejected the request or returned a non-JSON body
    #[error("Failed to fetch profile (HTTP {status}): {payload}")]
    GetProfile {
        /// HTTP status of the profile endpoint response
        status: u16,
        /// Raw provider body
        payload: ProviderPayload,
    },

    /// Identity could not be extracted from the provider profile
    #[error("Failed to fetch user id and email (HTTP {status}): {payload}")]
    GetIdEmail {
        /// HTTP status of the profile endpoint response
        status: u16,
        /// Raw provider body
        payload: ProviderPayload,
    },

    /// Provider declares no refresh endpoint
    #[error("Refresh token is not supported by this provider")]
    RefreshTokenNotSupported,

    /// Provider declares no revocation endpoint
    #[error("Revoke token is not supported by this provider")]
    RevokeTokenNotSupported,

    /// Network, DNS or TLS failure talking to the provider
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// OpenID configuration document could not be loaded
    #[error("OpenID discovery failed: {0}")]
    Discovery(String),

    /// Unknown provider name
    #[error("Unknown OAuth2 provider: {0}")]
    UnknownProvider(String),

    /// Provider not configured
    #[error("OAuth2 provider not configured: {0}")]
    ProviderNotConfigured(ProviderKind),
}

impl OAuthError {
    /// Raw provider payload carried by this error, if any
    #[must_use]
    pub const fn payload(&self) -> Option<&ProviderPayload> {
        match self {
            Self::InvalidTokenResponse(payload)
            | Self::GetAccessToken { payload, .. }
            | Self::RefreshToken { payload, .. }
            | Self::RevokeToken { payload, .. }
            | Self::GetProfile { payload, .. }
            | Self::GetIdEmail { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// HTTP status the provider answered with, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::GetAccessToken { status, .. }
            | Self::RefreshToken { status, .. }
            | Self::RevokeToken { status, .. }
            | Self::GetProfile { status, .. }
            | Self::GetIdEmail { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Re-tag a profile failure as an identity failure
    #[must_use]
    pub fn into_id_email(self) -> Self {
        match self {
            Self::GetProfile { status, payload } => Self::GetIdEmail { status, payload },
            other => other,
        }
    }
}
