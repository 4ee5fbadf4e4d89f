//! Integration tests for the generic OpenID Connect adapter

use acton_oauth::prelude::*;
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_discovery(server: &MockServer, revocation: bool) {
    let mut document = json!({
        "issuer": server.uri(),
        "authorization_endpoint": format!("{}/authorize", server.uri()),
        "token_endpoint": format!("{}/token", server.uri()),
        "userinfo_endpoint": format!("{}/userinfo", server.uri()),
        "jwks_uri": format!("{}/jwks", server.uri())
    });
    if revocation {
        document["revocation_endpoint"] = json!(format!("{}/revoke", server.uri()));
    }

    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document))
        .mount(server)
        .await;
}

fn discovery_config(server: &MockServer) -> ProviderConfig {
    let mut config = ProviderConfig::new("CLIENT_ID", "CLIENT_SECRET");
    config.discovery_url = Some(format!("{}/.well-known/openid-configuration", server.uri()));
    config
}

#[tokio::test]
async fn test_discovery_configures_client() {
    let server = MockServer::start().await;
    mount_discovery(&server, true).await;

    let provider = OidcProvider::new(&discovery_config(&server)).await.unwrap();
    let client = provider.client();

    assert_eq!(
        client.authorize_endpoint().as_str(),
        format!("{}/authorize", server.uri())
    );
    assert_eq!(
        client.refresh_token_endpoint().map(Url::to_string),
        Some(format!("{}/token", server.uri()))
    );
    assert_eq!(
        client.revoke_token_endpoint().map(Url::to_string),
        Some(format!("{}/revoke", server.uri()))
    );
}

#[tokio::test]
async fn test_discovery_without_revocation() {
    let server = MockServer::start().await;
    mount_discovery(&server, false).await;

    let provider = OidcProvider::new(&discovery_config(&server)).await.unwrap();
    let result = provider.client().revoke_token("T", None).await;
    assert!(matches!(result, Err(OAuthError::RevokeTokenNotSupported)));
}

#[tokio::test]
async fn test_discovery_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = OidcProvider::new(&discovery_config(&server)).await;
    assert!(matches!(result, Err(OAuthError::Discovery(_))));
}

#[tokio::test]
async fn test_discovery_invalid_document() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/.well-known/openid-configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"issuer": "x"})))
        .mount(&server)
        .await;

    let result = OidcProvider::new(&discovery_config(&server)).await;
    assert!(matches!(result, Err(OAuthError::Discovery(_))));
}

#[tokio::test]
async fn test_get_id_email_from_userinfo() {
    let server = MockServer::start().await;
    mount_discovery(&server, false).await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer TOKEN"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "248289761001",
            "email": "jane@example.com",
            "email_verified": true,
            "name": "Jane Doe",
            "locale": "en"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = from_config(ProviderKind::Oidc, &discovery_config(&server))
        .await
        .unwrap();
    let profile = provider.get_id_email("TOKEN").await.unwrap();

    assert_eq!(provider.name(), "oidc");
    assert_eq!(profile.user_id, "248289761001");
    assert_eq!(profile.user_email.as_deref(), Some("jane@example.com"));
    assert_eq!(
        serde_json::Value::Object(profile.extra_data),
        json!({"name": "Jane Doe", "email_verified": true})
    );
}

#[tokio::test]
async fn test_missing_sub_is_id_email_error() {
    let server = MockServer::start().await;
    mount_discovery(&server, false).await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"email": "jane@example.com"})),
        )
        .mount(&server)
        .await;

    let provider = OidcProvider::new(&discovery_config(&server)).await.unwrap();
    let result = provider.get_id_email("TOKEN").await;
    assert!(matches!(result, Err(OAuthError::GetIdEmail { status: 200, .. })));
}
