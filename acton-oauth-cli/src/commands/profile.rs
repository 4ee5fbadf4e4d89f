//! Profile command

use std::path::Path;

use acton_oauth::oauth2::ProviderKind;
use anyhow::{Context, Result};
use clap::Args;

use super::{load_provider, print_json, status, SUCCESS};

/// Fetch the user profile
#[derive(Debug, Args)]
pub struct ProfileCommand {
    /// Provider (google, github, oidc)
    pub provider: ProviderKind,

    /// Access token
    #[arg(long)]
    pub access_token: String,

    /// Print the provider's raw profile instead of the normalized identity
    #[arg(long)]
    pub raw: bool,
}

impl ProfileCommand {
    /// Execute the command
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the access token
    pub async fn execute(&self, config_path: &Path) -> Result<()> {
        let provider = load_provider(config_path, self.provider).await?;

        if self.raw {
            let profile = provider
                .get_profile(&self.access_token)
                .await
                .context("Profile request failed")?;
            status(&SUCCESS, &format!("Raw {} profile", provider.name()));
            return print_json(&profile);
        }

        let profile = provider
            .get_id_email(&self.access_token)
            .await
            .context("Identity request failed")?;
        status(&SUCCESS, &format!("Signed in as {}", profile.user_id));
        print_json(&profile)
    }
}
