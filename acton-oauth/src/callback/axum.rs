//! Axum integration for the callback adapter
//!
//! # Example
//!
//! ```rust,no_run
//! use acton_oauth::callback::{axum::RouteTable, AuthorizeCallback, CallbackError};
//! use axum::{extract::{Request, State}, routing::get, Json, Router};
//! use std::sync::Arc;
//!
//! struct AppState {
//!     callback: AuthorizeCallback,
//!     routes: RouteTable,
//! }
//!
//! async fn oauth_callback(
//!     State(state): State<Arc<AppState>>,
//!     request: Request,
//! ) -> Result<Json<serde_json::Value>, CallbackError> {
//!     let (parts, _body) = request.into_parts();
//!     let (token, _state) = state.callback.handle(&state.routes, &parts).await?;
//!     Ok(Json(serde_json::to_value(&token).unwrap_or_default()))
//! }
//!
//! # fn app(state: Arc<AppState>) -> Router {
//! Router::new()
//!     .route("/auth/callback", get(oauth_callback))
//!     .with_state(state)
//! # }
//! ```

use std::collections::HashMap;

use axum::{
    extract::Query,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::{AuthorizeCallback, CallbackError, CallbackParams, RouteResolver};
use crate::error::OAuthError;
use crate::oauth2::token::OAuth2Token;

/// Named routes of the application (name → path)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    /// Create an empty route table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named route
    #[must_use]
    pub fn with_route(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.routes.insert(name.into(), path.into());
        self
    }

    /// Path of a named route
    #[must_use]
    pub fn path(&self, name: &str) -> Option<&str> {
        self.routes.get(name).map(String::as_str)
    }
}

/// Route table bound to the scheme and host of one request
#[derive(Debug)]
pub struct RequestRoutes<'a> {
    table: &'a RouteTable,
    origin: String,
}

impl<'a> RequestRoutes<'a> {
    /// Resolve routes against the request's `X-Forwarded-Proto` and `Host`
    #[must_use]
    pub fn from_parts(table: &'a RouteTable, parts: &Parts) -> Self {
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .or_else(|| parts.uri.scheme_str())
            .unwrap_or("http");

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .or_else(|| parts.uri.authority().map(|authority| authority.as_str()))
            .unwrap_or("localhost");

        Self {
            table,
            origin: format!("{scheme}://{host}"),
        }
    }

    /// Scheme and host routes are resolved against
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl RouteResolver for RequestRoutes<'_> {
    fn url_for(&self, route_name: &str) -> Result<String, CallbackError> {
        self.table
            .path(route_name)
            .map(|path| format!("{}{path}", self.origin))
            .ok_or_else(|| CallbackError::Misconfigured(format!("Unknown route: {route_name}")))
    }
}

impl AuthorizeCallback {
    /// Run the callback for an axum request
    ///
    /// # Errors
    ///
    /// Returns `BadRequest` for an unparsable query string, otherwise the
    /// errors of [`AuthorizeCallback::call`]
    pub async fn handle(
        &self,
        routes: &RouteTable,
        parts: &Parts,
    ) -> Result<(OAuth2Token, Option<String>), CallbackError> {
        let Query(params) = Query::<CallbackParams>::try_from_uri(&parts.uri).map_err(|e| {
            CallbackError::BadRequest {
                detail: Some(e.body_text()),
            }
        })?;

        self.call(params, &RequestRoutes::from_parts(routes, parts)).await
    }
}

impl IntoResponse for CallbackError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest { detail } => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "detail": detail.unwrap_or_default() })),
            )
                .into_response(),
            Self::Misconfigured(message) => {
                tracing::error!(error = %message, "OAuth2 callback misconfigured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "OAuth2 callback misconfigured" })),
                )
                    .into_response()
            }
            Self::OAuth(OAuthError::Transport(error)) => {
                tracing::warn!(error = %error, "OAuth2 provider unreachable");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(json!({ "detail": "OAuth2 provider unreachable" })),
                )
                    .into_response()
            }
            Self::OAuth(error) => {
                tracing::warn!(error = %error, "OAuth2 code exchange failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "OAuth2 code exchange failed" })),
                )
                    .into_response()
            }
        }
    }
}
