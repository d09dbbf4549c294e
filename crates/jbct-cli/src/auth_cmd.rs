//! Auth subcommands: session token, whoami, logout, status.
//!
//! User-facing output uses writeln! to stdout (this is a CLI binary, not debug output).

use std::io::{self, Write};

use reqwest::StatusCode;
use reqwest::header::COOKIE;
use serde::Deserialize;
use tracing::warn;

use crate::config::CliConfig;

/// Default backend URL when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Auth subcommand actions.
#[derive(clap::Subcommand, Debug)]
pub enum AuthAction {
    /// Store a session token (the `auth_token` cookie from a browser login).
    SetToken {
        /// Session token.
        token: String,
    },
    /// Ask the backend who the stored session belongs to.
    Whoami,
    /// Revoke the stored session on the backend and forget it.
    Logout,
    /// Show stored connection settings.
    Status,
}

/// Principal as returned by `GET /api/v1/auth/me`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub picture: Option<String>,
}

/// Execute an auth subcommand.
pub async fn run(action: AuthAction, config: &mut CliConfig) -> anyhow::Result<()> {
    match action {
        AuthAction::SetToken { token } => {
            config.session_token = Some(token);
            config.save()?;
            writeln!(io::stdout(), "Session token stored")?;
            Ok(())
        }
        AuthAction::Whoami => whoami(config).await,
        AuthAction::Logout => logout(config).await,
        AuthAction::Status => {
            status(config, &mut io::stdout())?;
            Ok(())
        }
    }
}

/// Endpoint URL under the auth prefix.
pub fn auth_url(config: &CliConfig, path: &str) -> String {
    let base = config.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
    format!("{}/api/v1/auth/{path}", base.trim_end_matches('/'))
}

fn authed_request(
    http: &reqwest::Client,
    method: reqwest::Method,
    config: &CliConfig,
    path: &str,
) -> anyhow::Result<reqwest::RequestBuilder> {
    let api_key = config
        .api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("No API key configured. Use --api-key or JBCT_API_KEY"))?;
    let token = config
        .session_token
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run: jbct auth set-token <token>"))?;

    Ok(http
        .request(method, auth_url(config, path))
        .header("x-api-key", api_key)
        .header(COOKIE, format!("auth_token={token}")))
}

async fn whoami(config: &CliConfig) -> anyhow::Result<()> {
    let http = reqwest::Client::new();
    let resp = authed_request(&http, reqwest::Method::GET, config, "me")?
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to reach backend: {e}"))?;

    match resp.status() {
        StatusCode::OK => {
            let me: Me = resp.json().await?;
            let mut out = io::stdout();
            writeln!(out, "Logged in as: {}", me.username)?;
            writeln!(out, "Email: {}", me.email)?;
            writeln!(out, "User ID: {}", me.user_id)?;
            if let Some(picture) = me.picture {
                writeln!(out, "Picture: {picture}")?;
            }
            Ok(())
        }
        StatusCode::UNAUTHORIZED => Err(anyhow::anyhow!(
            "Session rejected: {}",
            error_description(resp).await
        )),
        other => Err(anyhow::anyhow!("Unexpected response from backend: {other}")),
    }
}

async fn logout(config: &mut CliConfig) -> anyhow::Result<()> {
    if config.session_token.is_some() {
        let http = reqwest::Client::new();
        match authed_request(&http, reqwest::Method::POST, config, "logout") {
            Ok(req) => match req.send().await {
                Ok(resp) if resp.status() == StatusCode::NO_CONTENT => {}
                Ok(resp) => {
                    warn!(status = %resp.status(), "Backend did not revoke the session");
                }
                Err(e) => warn!(error = %e, "Failed to reach backend for logout"),
            },
            Err(e) => warn!(error = %e, "Skipping remote logout"),
        }
    }
    config.clear_session();
    config.save()?;
    writeln!(io::stdout(), "Logged out")?;
    Ok(())
}

async fn error_description(resp: reqwest::Response) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error_description: String,
    }
    resp.json::<ErrorBody>()
        .await
        .map_or_else(|_| "unauthorized".to_string(), |b| b.error_description)
}

fn status(config: &CliConfig, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "Backend: {}",
        config.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    )?;
    writeln!(
        out,
        "API key: {}",
        if config.api_key.is_some() { "set" } else { "not set" }
    )?;
    writeln!(
        out,
        "Session: {}",
        if config.session_token.is_some() {
            "stored"
        } else {
            "not logged in"
        }
    )
}
