//! Google OAuth2 provider implementation
//!
//! Identity comes from the People API (`people/me`). Which attributes are
//! requested is controlled by the configured `fields`, translated into the
//! People API `personFields` selector.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::base::{BaseProvider, ProviderDefaults};
use crate::config::ProviderConfig;
use crate::error::{OAuthError, ProviderPayload};
use crate::oauth2::client::OAuth2Client;
use crate::oauth2::provider::{
    attribute_array, copy_field, primary_entry, OAuth2Provider, ProviderKind, ProviderProfile,
    METADATA_PRIMARY,
};

/// Authorization endpoint
pub const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Token endpoint, also used for refresh
pub const ACCESS_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
/// Revocation endpoint
pub const REVOKE_TOKEN_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/revoke";
/// People API profile endpoint
pub const PROFILE_ENDPOINT: &str = "https://people.googleapis.com/v1/people/me";
/// Scopes requested by default
pub const BASE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://www.googleapis.com/auth/userinfo.email",
];

/// Profile attribute a Google client can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoogleField {
    /// `resourceName`, always returned
    Id,
    /// Primary email address
    Email,
    /// Given name of the primary name entry
    FirstName,
    /// Family name of the primary name entry
    LastName,
    /// Primary photo (`url` and `default`)
    Picture,
}

impl GoogleField {
    /// Fields requested when none are configured
    pub const DEFAULT: [Self; 2] = [Self::Id, Self::Email];

    /// Configuration name of the field
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Email => "email",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Picture => "picture",
        }
    }

    /// People API person field carrying this attribute
    #[must_use]
    pub const fn person_field(&self) -> Option<&'static str> {
        match self {
            Self::Id => None,
            Self::Email => Some("emailAddresses"),
            Self::FirstName | Self::LastName => Some("names"),
            Self::Picture => Some("photos"),
        }
    }
}

impl fmt::Display for GoogleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoogleField {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "email" => Ok(Self::Email),
            "first_name" => Ok(Self::FirstName),
            "last_name" => Ok(Self::LastName),
            "picture" => Ok(Self::Picture),
            other => Err(OAuthError::Config(format!("Unknown Google profile field: {other}"))),
        }
    }
}

/// Google OAuth2 provider
#[derive(Debug, Clone)]
pub struct GoogleProvider {
    base: BaseProvider,
    fields: Vec<GoogleField>,
}

impl GoogleProvider {
    /// Create a new Google OAuth2 provider
    ///
    /// # Errors
    ///
    /// Returns `Config` if an endpoint override is not a valid URL or a
    /// configured field is unknown
    pub fn new(config: &ProviderConfig) -> Result<Self, OAuthError> {
        let fields = match &config.fields {
            Some(names) => names
                .iter()
                .map(|name| name.parse())
                .collect::<Result<Vec<GoogleField>, _>>()?,
            None => GoogleField::DEFAULT.to_vec(),
        };

        let base = BaseProvider::new(
            config,
            ProviderDefaults {
                kind: ProviderKind::Google,
                authorize_endpoint: AUTHORIZE_ENDPOINT,
                access_token_endpoint: ACCESS_TOKEN_ENDPOINT,
                refresh_at_token_endpoint: true,
                revoke_token_endpoint: Some(REVOKE_TOKEN_ENDPOINT),
                profile_endpoint: PROFILE_ENDPOINT,
                base_scopes: &BASE_SCOPES,
            },
        )?;

        Ok(Self { base, fields })
    }

    /// Requested profile attributes
    #[must_use]
    pub fn fields(&self) -> &[GoogleField] {
        &self.fields
    }

    /// `personFields` selector for the requested attributes
    #[must_use]
    pub fn person_fields(&self) -> String {
        let mut person_fields: Vec<&str> = Vec::new();
        for field in self.fields.iter().filter_map(GoogleField::person_field) {
            if !person_fields.contains(&field) {
                person_fields.push(field);
            }
        }
        person_fields.join(",")
    }

    fn requested(&self, field: GoogleField) -> bool {
        self.fields.contains(&field)
    }

    fn extra_data(&self, profile: &Value) -> Map<String, Value> {
        let mut extra_data = Map::new();

        let name = primary_entry(attribute_array(profile, "names"), METADATA_PRIMARY);
        if self.requested(GoogleField::FirstName) {
            copy_field(&mut extra_data, "first_name", name, "givenName");
        }
        if self.requested(GoogleField::LastName) {
            copy_field(&mut extra_data, "last_name", name, "familyName");
        }

        if self.requested(GoogleField::Picture) {
            let photo = primary_entry(attribute_array(profile, "photos"), METADATA_PRIMARY);
            let mut picture = Map::new();
            copy_field(&mut picture, "url", photo, "url");
            copy_field(&mut picture, "default", photo, "default");
            if !picture.is_empty() {
                extra_data.insert("picture".to_string(), Value::Object(picture));
            }
        }

        extra_data
    }
}

#[async_trait]
impl OAuth2Provider for GoogleProvider {
    fn client(&self) -> &OAuth2Client {
        self.base.client()
    }

    async fn get_profile(&self, access_token: &str) -> Result<Value, OAuthError> {
        let person_fields = self.person_fields();
        self.base
            .fetch_profile_json(access_token, &[("personFields", person_fields.as_str())], &[])
            .await
    }

    async fn get_id_email(&self, access_token: &str) -> Result<ProviderProfile, OAuthError> {
        let profile = self
            .get_profile(access_token)
            .await
            .map_err(OAuthError::into_id_email)?;

        let user_id = profile
            .get("resourceName")
            .and_then(Value::as_str)
            .map(str::to_string);
        let Some(user_id) = user_id else {
            tracing::warn!(provider = "google", "Profile has no resourceName");
            return Err(OAuthError::GetIdEmail {
                status: 200,
                payload: ProviderPayload::Json(profile),
            });
        };

        let emails = attribute_array(&profile, "emailAddresses");
        let user_email = primary_entry(emails, METADATA_PRIMARY)
            .and_then(|entry| entry.get("value"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(ProviderProfile {
            user_id,
            user_email,
            extra_data: self.extra_data(&profile),
        })
    }
}
