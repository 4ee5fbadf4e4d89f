//! PKCE and CSRF state helpers
//!
//! Thin wrappers over the `oauth2` crate generators, returning plain strings
//! that can be stored in a session and later fed back into
//! [`OAuth2Client::get_access_token`](super::client::OAuth2Client::get_access_token).

use std::fmt;

use oauth2::{CsrfToken, PkceCodeChallenge};
use serde::{Deserialize, Serialize};

/// PKCE code challenge method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeChallengeMethod {
    /// Challenge equals the verifier
    #[serde(rename = "plain")]
    Plain,
    /// Challenge is the base64url SHA-256 of the verifier
    #[default]
    S256,
}

impl CodeChallengeMethod {
    /// Wire value of the method
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }
}

impl fmt::Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PKCE verifier/challenge pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    /// Secret verifier, sent with the token exchange
    pub verifier: String,
    /// Challenge, sent with the authorization request
    pub challenge: String,
    /// How the challenge was derived
    pub method: CodeChallengeMethod,
}

impl PkcePair {
    /// Generate a random S256 pair
    #[must_use]
    pub fn generate() -> Self {
        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        Self {
            verifier: verifier.secret().clone(),
            challenge: challenge.as_str().to_string(),
            method: CodeChallengeMethod::S256,
        }
    }
}

/// Generate a random CSRF state token
#[must_use]
pub fn generate_state() -> String {
    CsrfToken::new_random().secret().clone()
}
