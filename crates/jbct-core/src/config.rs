//! Configuration resolution for the JBCT backend.
//!
//! Resolution order (lowest to highest priority):
//! 1. Built-in defaults
//! 2. Optional JSON settings file
//! 3. Environment variables (`PORT`, `POSTGRES_HOST`, `JWT_SECRET`, ...)
//!
//! The binary gathers everything into a [`ServerConfig`] once at startup and
//! injects it; nothing reads the environment after that.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Development API key, refused in production.
pub const DEV_API_KEY: &str = "hello_jbct_api_key";

/// Development JWT secret, refused in production.
pub const DEV_JWT_SECRET: &str = "hello_jbct_jwt_secret";

/// Deployment environment, read from `NODE_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }
}

/// Complete backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    /// Origin of the web frontend; CORS origin and post-login redirect base.
    pub frontend_url: String,
    /// Public base URL of this API; used to build OAuth redirect URIs.
    pub api_url: String,
    /// Pre-shared value expected in the `x-api-key` header.
    pub api_key: String,
    /// HMAC secret for session tokens.
    pub jwt_secret: String,
    #[serde(default)]
    pub google: OAuthClientConfig,
    #[serde(default)]
    pub github: OAuthClientConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            environment: Environment::Development,
            postgres: PostgresConfig::default(),
            redis: RedisConfig::default(),
            frontend_url: "http://localhost:3000".to_string(),
            api_url: "http://localhost:3001".to_string(),
            api_key: DEV_API_KEY.to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            google: OAuthClientConfig::default(),
            github: OAuthClientConfig::default(),
        }
    }
}

/// Postgres connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: "postgres".to_string(),
            port: 5432,
            username: "jbct".to_string(),
            password: String::new(),
            database: "jbct_db".to_string(),
            max_connections: 10,
        }
    }
}

/// Redis connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "redis".to_string(),
            port: 6379,
            connect_timeout_ms: 5000,
        }
    }
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}", self.host, self.port)
    }
}

/// OAuth client credentials for one provider.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OAuthClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthClientConfig {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

impl ServerConfig {
    /// Refuse configurations that cannot work or are unsafe to run.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::Config("API key must not be empty".into()));
        }
        if self.jwt_secret.is_empty() {
            return Err(Error::Config("JWT secret must not be empty".into()));
        }
        if self.environment.is_production() {
            if self.api_key == DEV_API_KEY {
                return Err(Error::Config(
                    "API_KEY is still the development default".into(),
                ));
            }
            if self.jwt_secret == DEV_JWT_SECRET {
                return Err(Error::Config(
                    "JWT_SECRET is still the development default".into(),
                ));
            }
        }
        if !self.google.is_configured() && !self.github.is_configured() {
            return Err(Error::Config(
                "at least one OAuth provider (Google or GitHub) must be configured".into(),
            ));
        }
        Ok(())
    }

    /// Redirect URI registered with the provider for `provider` (e.g. `"google"`).
    pub fn oauth_callback_url(&self, provider: &str) -> String {
        format!(
            "{}/api/v1/auth/{provider}/callback",
            self.api_url.trim_end_matches('/')
        )
    }
}

/// Load configuration: defaults, then an optional JSON file, then the process environment.
pub fn load_config(settings_file: Option<&Path>) -> Result<ServerConfig> {
    let mut config = match settings_file {
        Some(path) => load_config_file(path)?,
        None => ServerConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<ServerConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Apply environment overrides using `lookup` to resolve variables.
pub fn apply_env_overrides<F>(config: &mut ServerConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(n) = lookup("PORT").and_then(|v| v.parse().ok()) {
        config.port = n;
    }
    if let Some(val) = lookup("NODE_ENV") {
        config.environment = Environment::parse(&val);
    }

    if let Some(val) = lookup("POSTGRES_HOST") {
        config.postgres.host = val;
    }
    if let Some(n) = lookup("POSTGRES_PORT").and_then(|v| v.parse().ok()) {
        config.postgres.port = n;
    }
    if let Some(val) = lookup("POSTGRES_USER") {
        config.postgres.username = val;
    }
    if let Some(val) = lookup("POSTGRES_PASSWORD") {
        config.postgres.password = val;
    }
    if let Some(val) = lookup("POSTGRES_NAME") {
        config.postgres.database = val;
    }

    if let Some(val) = lookup("REDIS_HOST") {
        config.redis.host = val;
    }
    if let Some(n) = lookup("REDIS_PORT").and_then(|v| v.parse().ok()) {
        config.redis.port = n;
    }

    if let Some(val) = lookup("FRONTEND_URL") {
        config.frontend_url = val;
    }
    if let Some(val) = lookup("API_URL") {
        config.api_url = val;
    }
    if let Some(val) = lookup("API_KEY") {
        config.api_key = val;
    }
    if let Some(val) = lookup("JWT_SECRET") {
        config.jwt_secret = val;
    }

    if let Some(val) = lookup("GOOGLE_CLIENT_ID") {
        config.google.client_id = val;
    }
    if let Some(val) = lookup("GOOGLE_CLIENT_SECRET") {
        config.google.client_secret = val;
    }
    if let Some(val) = lookup("GITHUB_CLIENT_ID") {
        config.github.client_id = val;
    }
    if let Some(val) = lookup("GITHUB_CLIENT_SECRET") {
        config.github.client_secret = val;
    }
}
