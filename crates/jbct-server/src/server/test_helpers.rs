//! Shared fixtures for router tests: fake providers and in-memory stores.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, header};
use http_body_util::BodyExt;
use jbct_core::config::{Environment, OAuthClientConfig, ServerConfig};

use super::{API_KEY_HEADER, AppState, router};
use crate::blacklist::MemoryBlacklist;
use crate::oauth::{OAuthError, OAuthProvider, ProviderKind, ProviderProfile, ProviderRegistry};
use crate::storage::MemoryUserStore;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const FRONTEND: &str = "http://localhost:3000";

/// Authorization code the fake provider accepts.
pub const GOOD_CODE: &str = "good-code";

/// Provider that answers locally with a canned profile.
pub struct FakeProvider {
    kind: ProviderKind,
    profile: ProviderProfile,
}

impl FakeProvider {
    pub fn new(kind: ProviderKind, profile: ProviderProfile) -> Self {
        Self { kind, profile }
    }
}

#[async_trait]
impl OAuthProvider for FakeProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://idp.test/{}/authorize?state={state}", self.kind)
    }

    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, OAuthError> {
        if code == GOOD_CODE {
            Ok(self.profile.clone())
        } else {
            Err(OAuthError::Denied("bad_verification_code".into()))
        }
    }
}

pub fn profile(email: &str, name: &str) -> ProviderProfile {
    ProviderProfile {
        email: Some(email.into()),
        display_name: Some(name.into()),
        login: None,
        picture: Some(format!("https://img.test/{name}.png")),
    }
}

pub fn test_config(environment: Environment) -> ServerConfig {
    ServerConfig {
        environment,
        frontend_url: FRONTEND.into(),
        api_key: TEST_API_KEY.into(),
        jwt_secret: TEST_JWT_SECRET.into(),
        google: OAuthClientConfig {
            client_id: "gid".into(),
            client_secret: "gsecret".into(),
        },
        ..ServerConfig::default()
    }
}

/// Fixture holding the router and handles on its in-memory backends.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub users: Arc<MemoryUserStore>,
    pub blacklist: Arc<MemoryBlacklist>,
}

/// App with only Google enabled, answering with `google_profile`.
pub fn test_app_with(environment: Environment, google_profile: ProviderProfile) -> TestApp {
    let users = Arc::new(MemoryUserStore::new());
    let blacklist = Arc::new(MemoryBlacklist::new());

    let mut providers = ProviderRegistry::new();
    providers.insert(Arc::new(FakeProvider::new(
        ProviderKind::Google,
        google_profile,
    )));

    let state = AppState::new(
        test_config(environment),
        users.clone(),
        blacklist.clone(),
        providers,
    );
    let app = router(state.clone()).unwrap();
    TestApp {
        app,
        state,
        users,
        blacklist,
    }
}

pub fn test_app() -> TestApp {
    test_app_with(
        Environment::Development,
        profile("alice@example.com", "Alice"),
    )
}

/// Request builder with the API key already set.
pub fn api_request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(API_KEY_HEADER, TEST_API_KEY)
}

pub fn with_session(
    builder: axum::http::request::Builder,
    token: &str,
) -> axum::http::request::Builder {
    builder.header(header::COOKIE, format!("auth_token={token}"))
}

pub fn empty(builder: axum::http::request::Builder) -> Request<Body> {
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// All `Set-Cookie` header values.
pub fn set_cookies(resp: &Response<Body>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

/// Value of the cookie `name` set by `resp`, if any.
pub fn cookie_value(resp: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(resp).into_iter().find_map(|c| {
        c.strip_prefix(&prefix)
            .map(|rest| rest.split(';').next().unwrap_or_default().to_string())
    })
}

pub fn location(resp: &Response<Body>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}
