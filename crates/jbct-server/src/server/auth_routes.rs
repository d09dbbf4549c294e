//! `/api/v1/auth` route handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::error::ApiError;
use super::session::{
    SESSION_COOKIE, STATE_COOKIE, Session, remaining_now, removal_cookie, session_cookie,
    state_cookie,
};
use super::state::AppState;
use crate::auth::Principal;
use crate::oauth::{LoginOutcome, OAuthProvider, ProviderKind, generate_state};

/// Query parameters a provider appends when redirecting back.
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// `302 Found` to the given location.
#[derive(Debug)]
pub struct Found(String);

impl Found {
    pub fn to(location: impl Into<String>) -> Self {
        Self(location.into())
    }
}

impl IntoResponse for Found {
    fn into_response(self) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, self.0)]).into_response()
    }
}

fn resolve_provider(
    state: &AppState,
    segment: &str,
) -> Result<(ProviderKind, Arc<dyn OAuthProvider>), ApiError> {
    let kind: ProviderKind = segment.parse()?;
    let provider = state
        .providers
        .get(kind)
        .ok_or_else(|| ApiError::NotFound(format!("Provider {kind} is not enabled")))?;
    Ok((kind, provider))
}

/// `GET /{provider}/login`: start the authorization-code flow.
#[instrument(skip(state, jar))]
pub async fn login(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Found), ApiError> {
    let (_, provider) = resolve_provider(&state, &provider)?;

    let oauth_state = generate_state();
    let url = provider.authorize_url(&oauth_state);
    let jar = jar.add(state_cookie(oauth_state, state.secure_cookies()));

    Ok((jar, Found::to(url)))
}

/// `GET /{provider}/callback`: finish the flow, set the session cookie and
/// send the browser back to the frontend.
///
/// The `state` cookie is cleared whether or not sign-in succeeds.
#[instrument(skip_all, fields(provider = %provider))]
pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
    jar: CookieJar,
) -> Result<(CookieJar, Found), (CookieJar, ApiError)> {
    let expected_state = jar.get(STATE_COOKIE).map(|c| c.value().to_string());
    let jar = jar.remove(removal_cookie(STATE_COOKIE));

    let (kind, outcome) = match finish_login(&state, &provider, params, expected_state).await {
        Ok(done) => done,
        Err(e) => return Err((jar, e)),
    };

    let jar = jar.add(session_cookie(
        outcome.session.token,
        state.jwt.session_ttl_secs(),
        state.secure_cookies(),
    ));
    let target = format!(
        "{}/auth/{kind}/callback",
        state.config.frontend_url.trim_end_matches('/')
    );
    Ok((jar, Found::to(target)))
}

async fn finish_login(
    state: &AppState,
    segment: &str,
    params: CallbackParams,
    expected_state: Option<String>,
) -> Result<(ProviderKind, LoginOutcome), ApiError> {
    let (kind, provider) = resolve_provider(state, segment)?;

    match (expected_state.as_deref(), params.state.as_deref()) {
        (Some(expected), Some(got)) if !expected.is_empty() && expected == got => {}
        _ => {
            warn!(provider = %kind, "OAuth state mismatch");
            return Err(ApiError::AuthenticationMissing("OAuth state mismatch"));
        }
    }

    if let Some(error) = params.error {
        let detail = params
            .error_description
            .map_or_else(|| error.clone(), |desc| format!("{error}: {desc}"));
        return Err(ApiError::Upstream(detail));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(ApiError::AuthenticationMissing("Missing authorization code"))?;

    let profile = provider.exchange_code(&code).await?;
    let outcome = state.bridge.complete_login(&profile).await?;
    if outcome.created {
        info!(provider = %kind, user_id = %outcome.user.id, "New user signed up");
    }
    Ok((kind, outcome))
}

/// `GET /me`: the principal of the current session.
pub async fn me(Extension(session): Extension<Session>) -> Json<Principal> {
    Json(session.principal)
}

/// `POST /logout`: revoke the current token for the rest of its lifetime.
#[instrument(skip_all, fields(user_id = %session.principal.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let ttl = remaining_now(&session);
    state.blacklist.revoke(&session.token, ttl).await?;
    info!(ttl_secs = ttl.as_secs(), "Session revoked");

    Ok((jar.remove(removal_cookie(SESSION_COOKIE)), StatusCode::NO_CONTENT))
}
