//! OAuth providers and the sign-in bridge.
//!
//! Each provider knows how to start the authorization-code flow and how to
//! turn a returned code into a [`ProviderProfile`]. Everything after that is
//! shared and lives in [`OAuthBridge`].

mod bridge;
mod github;
mod google;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jbct_core::config::ServerConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::storage::NewUser;

pub use bridge::{LoginError, LoginOutcome, OAuthBridge};
pub use github::GitHubProvider;
pub use google::GoogleProvider;

/// Timeout for every outbound provider call.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

/// Supported identity providers, named by their route segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    GitHub,
}

impl ProviderKind {
    pub const ALL: [Self; 2] = [Self::Google, Self::GitHub];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::GitHub => "github",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(Self::Google),
            "github" => Ok(Self::GitHub),
            other => Err(OAuthError::UnknownProvider(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider refused authorization: {0}")]
    Denied(String),

    #[error("Provider profile has no email address")]
    MissingEmail,

    #[error("Invalid provider URL: {0}")]
    Url(String),
}

/// Identity details returned by a provider after a successful exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderProfile {
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Account handle, when the provider has one distinct from the name.
    pub login: Option<String>,
    pub picture: Option<String>,
}

impl ProviderProfile {
    /// Display name, falling back to the login handle and then the email's
    /// local part.
    pub fn username(&self) -> Option<String> {
        fn non_empty(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }
        non_empty(self.display_name.as_deref())
            .or_else(|| non_empty(self.login.as_deref()))
            .or_else(|| {
                non_empty(self.email.as_deref())
                    .and_then(|e| e.split('@').next().filter(|s| !s.is_empty()))
            })
            .map(ToString::to_string)
    }

    /// Store input for this profile; a profile without email is unusable.
    pub fn to_new_user(&self) -> Result<NewUser, OAuthError> {
        let email = self
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or(OAuthError::MissingEmail)?;
        Ok(NewUser {
            email: email.to_string(),
            username: self.username().unwrap_or_else(|| email.to_string()),
            picture: self.picture.clone(),
        })
    }
}

/// One configured identity provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Provider consent page URL carrying `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for the user's profile.
    async fn exchange_code(&self, code: &str) -> Result<ProviderProfile, OAuthError>;
}

/// Token endpoint response shared by both providers.
///
/// GitHub reports failures with a 200 status and an `error` field.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_access_token(self) -> Result<String, OAuthError> {
        match (self.access_token, self.error) {
            (Some(token), None) if !token.is_empty() => Ok(token),
            (_, Some(error)) => Err(OAuthError::Denied(match self.error_description {
                Some(desc) => format!("{error}: {desc}"),
                None => error,
            })),
            _ => Err(OAuthError::Denied("token response without access_token".into())),
        }
    }
}

/// Fail on non-success HTTP status.
fn check_status(resp: &reqwest::Response) -> Result<(), OAuthError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(OAuthError::Api {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("Unknown").into(),
        });
    }
    Ok(())
}

/// Build `base?k=v&...` with proper encoding.
fn url_with_params(base: &str, params: &[(&str, &str)]) -> Result<String, OAuthError> {
    reqwest::Url::parse_with_params(base, params)
        .map(String::from)
        .map_err(|e| OAuthError::Url(e.to_string()))
}

/// Fresh anti-forgery `state`: 32 random bytes, hex encoded.
pub fn generate_state() -> String {
    hex::encode(rand::random::<[u8; 32]>())
}

/// Outbound HTTP client shared by all providers.
pub fn build_http_client() -> Result<reqwest::Client, OAuthError> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("jbct-server/", env!("CARGO_PKG_VERSION")))
        .timeout(PROVIDER_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Providers keyed by route segment.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn OAuthProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every provider that has credentials in `config`.
    pub fn from_config(config: &ServerConfig, http: &reqwest::Client) -> Self {
        let mut registry = Self::new();
        for kind in ProviderKind::ALL {
            let redirect_uri = config.oauth_callback_url(kind.as_str());
            match kind {
                ProviderKind::Google if config.google.is_configured() => {
                    registry.insert(Arc::new(GoogleProvider::new(
                        http.clone(),
                        &config.google,
                        redirect_uri,
                    )));
                }
                ProviderKind::GitHub if config.github.is_configured() => {
                    registry.insert(Arc::new(GitHubProvider::new(
                        http.clone(),
                        &config.github,
                        redirect_uri,
                    )));
                }
                _ => {
                    warn!(provider = %kind, "OAuth provider not configured, its routes will 404");
                    continue;
                }
            }
            info!(provider = %kind, "OAuth provider enabled");
        }
        registry
    }

    pub fn insert(&mut self, provider: Arc<dyn OAuthProvider>) {
        self.providers.insert(provider.kind(), provider);
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn OAuthProvider>> {
        self.providers.get(&kind).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
