//! OAuth2 token model
//!
//! `OAuth2Token` keeps the token endpoint response as a JSON mapping so that
//! provider-specific keys (`id_token`, `scope`, ...) survive untouched. The
//! only rewrite applied is expiry normalization: a relative `expires_in` is
//! turned into an absolute `expires_at` (seconds since the Unix epoch) once,
//! when the token is constructed.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{OAuthError, ProviderPayload};

/// Access token response with normalized expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct OAuth2Token(Map<String, Value>);

impl OAuth2Token {
    /// Build a token from a raw token endpoint response
    ///
    /// # Errors
    ///
    /// Returns `InvalidTokenResponse` if `access_token` is missing or
    /// `expires_in` is not numeric
    pub fn from_response(response: Map<String, Value>) -> Result<Self, OAuthError> {
        Self::from_response_at(response, Utc::now().timestamp())
    }

    /// Build a token using `now` (Unix seconds) as the reference time
    ///
    /// # Errors
    ///
    /// Returns `InvalidTokenResponse` if `access_token` is missing or
    /// `expires_in` is not numeric or too large to represent
    pub fn from_response_at(
        mut response: Map<String, Value>,
        now: i64,
    ) -> Result<Self, OAuthError> {
        if !response.get("access_token").is_some_and(Value::is_string) {
            return Err(invalid(response));
        }

        if !has_value(&response, "expires_at") {
            let expires_at = match response.get("expires_in") {
                None | Some(Value::Null) => None,
                Some(value) => Some(seconds(value).and_then(|secs| now.checked_add(secs))),
            };
            match expires_at {
                Some(Some(expires_at)) => {
                    response.insert("expires_at".to_string(), Value::from(expires_at));
                }
                Some(None) => return Err(invalid(response)),
                None => {}
            }
        }

        Ok(Self(response))
    }

    /// The access token
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.0
            .get("access_token")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Token type (usually "Bearer")
    #[must_use]
    pub fn token_type(&self) -> Option<&str> {
        self.0.get("token_type").and_then(Value::as_str)
    }

    /// Refresh token (if provided)
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.0.get("refresh_token").and_then(Value::as_str)
    }

    /// Absolute expiry in seconds since the Unix epoch
    #[must_use]
    pub fn expires_at(&self) -> Option<i64> {
        self.0.get("expires_at").and_then(seconds)
    }

    /// Granted scopes, split on whitespace
    #[must_use]
    pub fn scope(&self) -> Option<Vec<&str>> {
        self.0
            .get("scope")
            .and_then(Value::as_str)
            .map(|scope| scope.split_whitespace().collect())
    }

    /// Any other key of the response
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The full response mapping
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Check if the access token has expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    /// Check expiry against `now` (Unix seconds); tokens without expiry never expire
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }
}

impl TryFrom<Map<String, Value>> for OAuth2Token {
    type Error = OAuthError;

    fn try_from(value: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::from_response(value)
    }
}

impl From<OAuth2Token> for Map<String, Value> {
    fn from(token: OAuth2Token) -> Self {
        token.0
    }
}

fn invalid(response: Map<String, Value>) -> OAuthError {
    OAuthError::InvalidTokenResponse(ProviderPayload::Json(Value::Object(response)))
}

fn has_value(response: &Map<String, Value>, key: &str) -> bool {
    response.get(key).is_some_and(|value| !value.is_null())
}

// Providers send durations as integers, floats or numeric strings.
#[allow(clippy::cast_possible_truncation)]
fn seconds(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|secs| secs as i64)),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
