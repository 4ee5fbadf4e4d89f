//! acton-oauth: OAuth2 authorization-code client with normalized provider profiles
//!
//! - **Client core**: authorization URLs (scopes, state, PKCE, extra
//!   parameters), code exchange, refresh and revocation against any provider
//! - **Provider adapters**: Google, GitHub and generic OpenID Connect, each
//!   turning the provider's profile into `(user_id, user_email, extra_data)`
//! - **Callback adapter**: validates the authorization response and drives the
//!   code exchange, with an axum integration
//!
//! Every provider-reported failure carries the untouched response body; the
//! library never retries or swallows errors.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use acton_oauth::prelude::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = ProviderConfig::new("client-id", "client-secret")
//!     .with_fields(["id", "email", "first_name"]);
//! let google = GoogleProvider::new(&config)?;
//!
//! let pkce = PkcePair::generate();
//! let url = google.client().get_authorization_url(
//!     &AuthorizeParams::new("http://localhost:3000/auth/callback")
//!         .state(generate_state())
//!         .pkce(&pkce),
//! );
//! println!("Visit {url}");
//!
//! let token = google
//!     .client()
//!     .get_access_token(
//!         "code-from-callback",
//!         "http://localhost:3000/auth/callback",
//!         Some(pkce.verifier.as_str()),
//!     )
//!     .await?;
//! let profile = google.get_id_email(token.access_token()).await?;
//! println!("{} <{:?}>", profile.user_id, profile.user_email);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - `axum` - axum integration for the callback adapter (default)

pub mod callback;
pub mod config;
pub mod error;
pub mod oauth2;
pub mod observability;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use acton_oauth::prelude::*;
    //! ```

    // Client core
    pub use crate::oauth2::{
        generate_state, AuthorizeParams, ClientConfig, CodeChallengeMethod, OAuth2Client,
        OAuth2Token, PkcePair, TokenEndpointAuthMethod,
    };

    // Provider adapters
    pub use crate::oauth2::{
        from_config, GitHubProvider, GoogleField, GoogleProvider, OAuth2Provider, OidcProvider,
        ProviderKind, ProviderProfile,
    };

    // Callback adapter
    #[cfg(feature = "axum")]
    pub use crate::callback::axum::RouteTable;
    pub use crate::callback::{AuthorizeCallback, CallbackError, CallbackParams, RouteResolver};

    // Configuration
    pub use crate::config::{OAuthConfig, ProviderConfig};

    // Error types
    pub use crate::error::{OAuthError, ProviderPayload};
}
