//! HTTP server for the JBCT backend.
//!
//! Layering, outermost first: CORS, request tracing, API-key gate, routes.
//! `/me` and `/logout` additionally sit behind the session gate.

pub mod api_key;
pub mod auth_routes;
pub mod error;
pub mod session;
pub mod state;

#[cfg(test)]
mod test_helpers;


use axum::Router;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, InvalidHeaderValue};
use axum::http::{HeaderName, HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use api_key::{API_KEY_HEADER, require_api_key};
pub use error::ApiError;
pub use session::{SESSION_COOKIE, STATE_COOKIE, Session, require_session};
pub use state::AppState;

/// Route prefix for the authentication API.
pub const AUTH_PREFIX: &str = "/api/v1/auth";

/// Build the complete application router.
pub fn router(state: AppState) -> Result<Router, InvalidHeaderValue> {
    let protected = Router::new()
        .route("/me", get(auth_routes::me))
        .route("/logout", post(auth_routes::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let auth = Router::new()
        .route("/{provider}/login", get(auth_routes::login))
        .route("/{provider}/callback", get(auth_routes::callback))
        .merge(protected);

    let cors = cors_layer(&state.config.frontend_url)?;

    Ok(Router::new()
        .nest(AUTH_PREFIX, auth)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// CORS for the frontend origin with credentials.
pub fn cors_layer(frontend_url: &str) -> Result<CorsLayer, InvalidHeaderValue> {
    let origin = HeaderValue::from_str(frontend_url.trim_end_matches('/'))?;
    let api_key = HeaderName::from_static(API_KEY_HEADER);

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION, api_key.clone()])
        .expose_headers([api_key]))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("No such route".into())
}
