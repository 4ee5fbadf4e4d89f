//! OAuth2 client core and provider adapters

pub mod client;
pub mod http;
pub mod pkce;
pub mod provider;
pub mod providers;
pub mod token;

pub use client::{AuthorizeParams, ClientConfig, OAuth2Client, TokenEndpointAuthMethod};
pub use pkce::{generate_state, CodeChallengeMethod, PkcePair};
pub use provider::{OAuth2Provider, ProviderKind, ProviderProfile};
pub use providers::{from_config, GitHubProvider, GoogleField, GoogleProvider, OidcProvider};
pub use token::OAuth2Token;
