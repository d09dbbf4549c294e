//! GitHub OAuth provider.

use async_trait::async_trait;
use jbct_core::config::OAuthClientConfig;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{
    OAuthError, OAuthProvider, ProviderKind, ProviderProfile, TokenResponse, check_status,
    url_with_params,
};

const AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const API_BASE: &str = "https://api.github.com";
const SCOPES: &str = "user:email";
const API_ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct GitHubUser {
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
    verified: bool,
}

impl GitHubUser {
    fn into_profile(self, fallback_email: Option<String>) -> ProviderProfile {
        ProviderProfile {
            email: self.email.filter(|e| !e.is_empty()).or(fallback_email),
            display_name: self.name,
            login: Some(self.login),
            picture: self.avatar_url,
        }
    }
}

/// Primary verified address, else any verified one.
fn pick_email(emails: Vec<GitHubEmail>) -> Option<String> {
    let mut verified = emails.into_iter().filter(|e| e.verified);
    let first = verified.next()?;
    if first.primary {
        return Some(first.email);
    }
    Some(
        verified
            .find(|e| e.primary)
            .map_or(first.email, |primary| primary.email),
    )
}

pub struct GitHubProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GitHubProvider {
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
            .header(ACCEPT, "application/json")
            .form(&[
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

    async fn api_get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        access_token: &str,
    ) -> Result<T, OAuthError> {
        let resp = self
            .http
            .get(format!("{API_BASE}{path}"))
            .header(ACCEPT, API_ACCEPT)
            .bearer_auth(access_token)
            .send()
            .await?;
        check_status(&resp)?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl OAuthProvider for GitHubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::GitHub
    }

    fn authorize_url(&self, state: &str) -> String {
        // Fixed base URL; parsing cannot fail.
        url_with_params(
            AUTHORIZE_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .unwrap_or_else(|_| AUTHORIZE_URL.to_string())
    }

    #[instrument(skip_all, fields(provider = "github"))]
    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, OAuthError> {
        let access_token = self.fetch_access_token(code).await?;
        let user: GitHubUser = self.api_get("/user", &access_token).await?;

        let fallback_email = if user.email.as_deref().is_some_and(|e| !e.is_empty()) {
            None
        } else {
            debug!(login = %user.login, "No public email, querying /user/emails");
            let emails: Vec<GitHubEmail> = self.api_get("/user/emails", &access_token).await?;
            pick_email(emails)
        };

        Ok(user.into_profile(fallback_email))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn provider() -> GitHubProvider {
        GitHubProvider::new(
            reqwest::Client::new(),
            &OAuthClientConfig {
                client_id: "gh-client".into(),
                client_secret: "gh-secret".into(),
            },
            "https://api.jbct.dev/api/v1/auth/github/callback".into(),
        )
    }

    #[test]
    fn authorize_url_requests_email_scope() {
        let url = reqwest::Url::parse(&provider().authorize_url("s1")).unwrap();
        assert_eq!(url.host_str(), Some("github.com"));
        assert_eq!(url.path(), "/login/oauth/authorize");

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "gh-client");
        assert_eq!(params["scope"], "user:email");
        assert_eq!(params["state"], "s1");
        assert_eq!(
            params["redirect_uri"],
            "https://api.jbct.dev/api/v1/auth/github/callback"
        );
    }

    #[test]
    fn user_without_name_falls_back_to_login() {
        let user: GitHubUser = serde_json::from_str(
            r#"{
                "login": "octocat",
                "id": 1,
                "name": null,
                "email": "octo@github.com",
                "avatar_url": "https://avatars.githubusercontent.com/u/1"
            }"#,
        )
        .unwrap();
        let profile = user.into_profile(None);

        assert_eq!(profile.username().as_deref(), Some("octocat"));
        assert_eq!(profile.email.as_deref(), Some("octo@github.com"));
        assert_eq!(
            profile.picture.as_deref(),
            Some("https://avatars.githubusercontent.com/u/1")
        );
    }

    #[test]
    fn private_email_uses_fallback() {
        let user: GitHubUser =
            serde_json::from_str(r#"{"login": "ghost", "name": "Ghost", "email": null}"#).unwrap();
        let profile = user.into_profile(Some("ghost@users.example".into()));
        assert_eq!(profile.email.as_deref(), Some("ghost@users.example"));
        assert_eq!(profile.username().as_deref(), Some("Ghost"));
    }

    #[test]
    fn picks_primary_verified_email() {
        let emails: Vec<GitHubEmail> = serde_json::from_str(
            r#"[
                {"email": "old@x.com", "primary": false, "verified": true},
                {"email": "unverified@x.com", "primary": false, "verified": false},
                {"email": "main@x.com", "primary": true, "verified": true}
            ]"#,
        )
        .unwrap();
        assert_eq!(pick_email(emails).as_deref(), Some("main@x.com"));
    }

    #[test]
    fn falls_back_to_any_verified_email() {
        let emails = vec![
            GitHubEmail {
                email: "primary-unverified@x.com".into(),
                primary: true,
                verified: false,
            },
            GitHubEmail {
                email: "verified@x.com".into(),
                primary: false,
                verified: true,
            },
        ];
        assert_eq!(pick_email(emails).as_deref(), Some("verified@x.com"));
        assert_eq!(pick_email(Vec::new()), None);
    }
}
