//! Google OAuth 2.0 / OpenID Connect provider.

use async_trait::async_trait;
use jbct_core::config::OAuthClientConfig;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{
    OAuthError, OAuthProvider, ProviderKind, ProviderProfile, TokenResponse, check_status,
    url_with_params,
};

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "profile email";

/// OpenID Connect userinfo payload.
#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUserInfo> for ProviderProfile {
    fn from(info: GoogleUserInfo) -> Self {
        Self {
            email: info.email,
            display_name: info.name,
            login: None,
            picture: info.picture,
        }
    }
}

pub struct GoogleProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleProvider {
    pub fn new(http: reqwest::Client, client: &OAuthClientConfig, redirect_uri: String) -> Self {
        Self {
            http,
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
            redirect_uri,
        }
    }

    async fn fetch_access_token(&self, code: &str) -> Result<String, OAuthError> {
        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;
        check_status(&resp)?;
        resp.json::<TokenResponse>().await?.into_access_token()
    }
}

#[async_trait]
impl OAuthProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn authorize_url(&self, state: &str) -> String {
        // Fixed base URL; parsing cannot fail.
        url_with_params(
            AUTHORIZE_URL,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .unwrap_or_else(|_| AUTHORIZE_URL.to_string())
    }

    #[instrument(skip_all, fields(provider = "google"))]
    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, OAuthError> {
        let access_token = self.fetch_access_token(code).await?;

        let resp = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(&access_token)
            .send()
            .await?;
        check_status(&resp)?;
        let info: GoogleUserInfo = resp.json().await?;
        debug!(has_email = info.email.is_some(), "Fetched Google userinfo");

        Ok(info.into())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(
            reqwest::Client::new(),
            &OAuthClientConfig {
                client_id: "google-client".into(),
                client_secret: "google-secret".into(),
            },
            "http://localhost:3001/api/v1/auth/google/callback".into(),
        )
    }

    #[test]
    fn authorize_url_carries_client_scope_and_state() {
        let url = reqwest::Url::parse(&provider().authorize_url("abc123")).unwrap();
        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(url.path(), "/o/oauth2/v2/auth");

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "google-client");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["scope"], "profile email");
        assert_eq!(params["state"], "abc123");
        assert_eq!(
            params["redirect_uri"],
            "http://localhost:3001/api/v1/auth/google/callback"
        );
        assert!(!params.contains_key("client_secret"));
    }

    #[test]
    fn userinfo_maps_to_profile() {
        let info: GoogleUserInfo = serde_json::from_str(
            r#"{
                "sub": "1100",
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "email_verified": true,
                "picture": "https://lh3.googleusercontent.com/a/ada"
            }"#,
        )
        .unwrap();
        let profile = ProviderProfile::from(info);

        assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
        assert_eq!(profile.username().as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            profile.picture.as_deref(),
            Some("https://lh3.googleusercontent.com/a/ada")
        );
    }

    #[test]
    fn kind_is_google() {
        assert_eq!(provider().kind(), ProviderKind::Google);
    }
}
