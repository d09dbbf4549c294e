//! Pre-shared API key gate in front of every route.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::warn;

use super::error::ApiError;
use super::state::AppState;

/// Header carrying the pre-shared key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject any request whose `x-api-key` header differs from the configured key.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !provided.is_some_and(|key| keys_match(key, &state.config.api_key)) {
        warn!(
            path = %request.uri().path(),
            present = provided.is_some(),
            "Rejected request with invalid API key"
        );
        return Err(ApiError::AuthorizationDenied);
    }

    Ok(next.run(request).await)
}

/// Length-independent comparison that does not stop at the first mismatch.
fn keys_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    let diff = a
        .iter()
        .zip(b)
        .fold(a.len() ^ b.len(), |acc, (x, y)| acc | usize::from(x ^ y));
    diff == 0
}
