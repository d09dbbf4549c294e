#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use jbct_core::config::ServerConfig;
use jbct_server::blacklist::MemoryBlacklist;
use jbct_server::oauth::{
    OAuthError, OAuthProvider, ProviderKind, ProviderProfile, ProviderRegistry,
};
use jbct_server::server::{AppState, router};
use jbct_server::storage::MemoryUserStore;

const API_KEY: &str = "integration-key";

struct StaticGitHub;

#[async_trait]
impl OAuthProvider for StaticGitHub {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://github.test/authorize?state={state}")
    }

    async fn exchange_code(&self, _code: &str) -> Result<ProviderProfile, OAuthError> {
        Ok(ProviderProfile {
            email: Some("octo@github.test".into()),
            display_name: None,
            login: Some("octocat".into()),
            picture: Some("https://avatars.test/octocat".into()),
        })
    }
}

fn app() -> axum::Router {
    let config = ServerConfig {
        api_key: API_KEY.into(),
        jwt_secret: "integration-secret".into(),
        ..ServerConfig::default()
    };
    let mut providers = ProviderRegistry::new();
    providers.insert(Arc::new(StaticGitHub));

    let state = AppState::new(
        config,
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryBlacklist::new()),
        providers,
    );
    router(state).unwrap()
}

/// Send a request with the API key and return the response.
async fn send(req: axum::http::request::Builder) -> axum::response::Response {
    app()
        .oneshot(
            req.header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

fn set_cookie(resp: &axum::response::Response, name: &str) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|c| c.starts_with(&format!("{name}=")))
        .map(|c| {
            c.trim_start_matches(&format!("{name}="))
                .split(';')
                .next()
                .unwrap_or_default()
                .to_string()
        })
}

#[tokio::test]
async fn github_round_trip_then_me() {
    let app = app();

    let login = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/github/login")
                .header("x-api-key", API_KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::FOUND);
    let state = set_cookie(&login, "oauth_state").unwrap();

    let callback = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/auth/github/callback?code=c&state={state}"))
                .header("x-api-key", API_KEY)
                .header(header::COOKIE, format!("oauth_state={state}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(callback.status(), StatusCode::FOUND);
    let location = callback.headers()[header::LOCATION].to_str().unwrap();
    assert_eq!(location, "http://localhost:3000/auth/github/callback");
    let token = set_cookie(&callback, "auth_token").unwrap();

    let me = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/auth/me")
                .header("x-api-key", API_KEY)
                .header(header::COOKIE, format!("auth_token={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(me.status(), StatusCode::OK);
    let body = axum::body::to_bytes(me.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["username"], "octocat");
    assert_eq!(json["email"], "octo@github.test");
    assert_eq!(json["picture"], "https://avatars.test/octocat");
}

#[tokio::test]
async fn google_is_not_enabled() {
    let resp = send(Request::builder().uri("/api/v1/auth/google/login")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn me_requires_session() {
    let resp = send(Request::builder().uri("/api/v1/auth/me")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
