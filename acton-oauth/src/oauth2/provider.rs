//! Provider adapter contract
//!
//! Each identity provider is one type implementing [`OAuth2Provider`]: it
//! owns an [`OAuth2Client`] configured with the provider's endpoints and
//! knows how to turn the provider's profile payload into a
//! [`ProviderProfile`].

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::OAuthError;
use crate::oauth2::client::OAuth2Client;

/// OAuth2 provider identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Google (People API profile)
    Google,
    /// GitHub OAuth2
    GitHub,
    /// Generic OpenID Connect provider
    Oidc,
}

impl ProviderKind {
    /// Get the provider as a string (lowercase)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GitHub => "github",
            Self::Oidc => "oidc",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "github" => Ok(Self::GitHub),
            "oidc" | "openid" => Ok(Self::Oidc),
            _ => Err(OAuthError::UnknownProvider(s.to_string())),
        }
    }
}

/// Normalized identity returned by every provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Provider-specific user ID
    pub user_id: String,
    /// Email address, when the provider exposes one
    pub user_email: Option<String>,
    /// Provider-defined extra attributes
    pub extra_data: Map<String, Value>,
}

/// Capabilities every provider adapter implements
///
/// Token operations are reached through [`OAuth2Provider::client`]; the
/// adapter adds the profile calls.
#[async_trait]
pub trait OAuth2Provider: Send + Sync {
    /// Client configured with this provider's endpoints
    fn client(&self) -> &OAuth2Client;

    /// Short provider identifier
    fn name(&self) -> &str {
        self.client().name()
    }

    /// Fetch the raw profile payload
    ///
    /// # Errors
    ///
    /// Returns `GetProfile` with the provider body on a non-2xx answer and
    /// `Transport` on network failures
    async fn get_profile(&self, access_token: &str) -> Result<Value, OAuthError>;

    /// Fetch and normalize the user's identity
    ///
    /// # Errors
    ///
    /// Returns `GetIdEmail` with the provider body on a non-2xx answer or
    /// when the expected fields are missing, and `Transport` on network
    /// failures
    async fn get_id_email(&self, access_token: &str) -> Result<ProviderProfile, OAuthError>;
}

/// JSON pointer of the Google-style `metadata.primary` flag
pub const METADATA_PRIMARY: &str = "/metadata/primary";

/// Elements of a repeated attribute, or an empty slice
#[must_use]
pub fn attribute_array<'a>(profile: &'a Value, key: &str) -> &'a [Value] {
    profile
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Pick the entry whose `primary_flag` (a JSON pointer) is `true`, falling
/// back to the first entry
#[must_use]
pub fn primary_entry<'a>(entries: &'a [Value], primary_flag: &str) -> Option<&'a Value> {
    entries
        .iter()
        .find(|entry| entry.pointer(primary_flag).and_then(Value::as_bool) == Some(true))
        .or_else(|| entries.first())
}

/// Copy `key` from `source` into `target` as `name` when present and not null
pub(crate) fn copy_field(
    target: &mut Map<String, Value>,
    name: &str,
    source: Option<&Value>,
    key: &str,
) {
    if let Some(value) = source.and_then(|source| source.get(key)).filter(|v| !v.is_null()) {
        target.insert(name.to_string(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_as_str() {
        assert_eq!(ProviderKind::Google.as_str(), "google");
        assert_eq!(ProviderKind::GitHub.as_str(), "github");
        assert_eq!(ProviderKind::Oidc.to_string(), "oidc");
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("google".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        assert_eq!("GOOGLE".parse::<ProviderKind>().unwrap(), ProviderKind::Google);
        assert_eq!("github".parse::<ProviderKind>().unwrap(), ProviderKind::GitHub);
        assert_eq!("openid".parse::<ProviderKind>().unwrap(), ProviderKind::Oidc);
        assert!(matches!(
            "invalid".parse::<ProviderKind>(),
            Err(OAuthError::UnknownProvider(name)) if name == "invalid"
        ));
    }

    #[test]
    fn test_primary_entry_prefers_flag() {
        let entries = vec![
            json!({"metadata": {"primary": false}, "value": "second@example.com"}),
            json!({"metadata": {"primary": true}, "value": "primary@example.com"}),
        ];
        let entry = primary_entry(&entries, METADATA_PRIMARY).unwrap();
        assert_eq!(entry["value"], "primary@example.com");
    }

    #[test]
    fn test_primary_entry_falls_back_to_first() {
        let entries = vec![
            json!({"metadata": {"verified": true}, "value": "first@example.com"}),
            json!({"value": "second@example.com"}),
        ];
        let entry = primary_entry(&entries, METADATA_PRIMARY).unwrap();
        assert_eq!(entry["value"], "first@example.com");
        assert!(primary_entry(&[], METADATA_PRIMARY).is_none());
    }

    #[test]
    fn test_primary_entry_top_level_flag() {
        let entries = vec![
            json!({"email": "a@example.com", "primary": false}),
            json!({"email": "b@example.com", "primary": true}),
        ];
        let entry = primary_entry(&entries, "/primary").unwrap();
        assert_eq!(entry["email"], "b@example.com");
    }

    #[test]
    fn test_attribute_array_missing_key() {
        let profile = json!({"names": "not-an-array"});
        assert!(attribute_array(&profile, "names").is_empty());
        assert!(attribute_array(&profile, "photos").is_empty());
    }
}
