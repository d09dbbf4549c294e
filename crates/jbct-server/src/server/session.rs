//! Session cookie handling and the session gate.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use jbct_core::db::unix_timestamp;
use tracing::debug;

use super::error::ApiError;
use super::state::AppState;
use crate::auth::Principal;

/// Cookie holding the signed session token.
pub const SESSION_COOKIE: &str = "auth_token";

/// Cookie holding the OAuth anti-forgery `state` between login and callback.
pub const STATE_COOKIE: &str = "oauth_state";

/// Lifetime of the `state` cookie: 10 minutes.
pub const STATE_TTL_SECS: i64 = 10 * 60;

/// Verified session attached to requests that pass [`require_session`].
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    /// Raw token, the blacklist key.
    pub token: String,
    /// Unix timestamp.
    pub expires_at: i64,
}

impl Session {
    /// How long a revocation must last as of `now`: through the end of the
    /// `exp` second, since the token is still accepted during it. Never less
    /// than one second.
    pub fn remaining(&self, now: i64) -> Duration {
        let secs = (self.expires_at - now + 1).max(1);
        Duration::from_secs(secs.unsigned_abs())
    }
}

/// Session cookie: `HttpOnly`, `SameSite=None`, `Path=/`.
pub fn session_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::None)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Short-lived `state` cookie for the redirect round trip.
pub fn state_cookie(state: String, secure: bool) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, state))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(time::Duration::seconds(STATE_TTL_SECS))
        .build()
}

/// Cookie matching `name` for removal; path must equal the one it was set with.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

/// Require a valid, unrevoked session cookie and attach the [`Session`].
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::AuthenticationMissing("No session token provided"))?;

    let claims = state.jwt.validate(&token).map_err(|e| {
        debug!(error = %e, "Session token rejected");
        ApiError::AuthenticationMissing("Invalid session token")
    })?;

    if state.blacklist.is_revoked(&token).await? {
        debug!(user_id = %claims.user_id, "Revoked session token presented");
        return Err(ApiError::AuthenticationRevoked);
    }

    request.extensions_mut().insert(Session {
        principal: claims.principal(),
        token,
        expires_at: claims.exp,
    });
    Ok(next.run(request).await)
}

/// Remaining session lifetime from now.
pub fn remaining_now(session: &Session) -> Duration {
    session.remaining(unix_timestamp())
}
