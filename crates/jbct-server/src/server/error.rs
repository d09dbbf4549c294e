//! HTTP error type shared by every route and middleware.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::{error, warn};

use crate::blacklist::BlacklistError;
use crate::oauth::{LoginError, OAuthError};
use crate::storage::DatabaseError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    AuthenticationMissing(&'static str),

    #[error("Session has been revoked")]
    AuthenticationRevoked,

    #[error("Invalid API key")]
    AuthorizationDenied,

    #[error("Identity provider failure: {0}")]
    Upstream(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    error_description: String,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::AuthenticationMissing(_)
            | Self::AuthenticationRevoked
            | Self::AuthorizationDenied => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationMissing(_) => "authentication_missing",
            Self::AuthenticationRevoked => "authentication_revoked",
            Self::AuthorizationDenied => "authorization_denied",
            Self::Upstream(_) => "upstream_failure",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "server_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_description = match &self {
            Self::Upstream(detail) => {
                warn!(error = %detail, "Identity provider request failed");
                "Identity provider request failed".to_string()
            }
            Self::Internal(detail) => {
                error!(error = %detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: self.code(),
            error_description,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<OAuthError> for ApiError {
    fn from(e: OAuthError) -> Self {
        match e {
            OAuthError::UnknownProvider(p) => Self::NotFound(format!("Unknown provider: {p}")),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::Profile(e) => e.into(),
            LoginError::Store(e) => Self::Internal(e.to_string()),
            LoginError::Token(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<BlacklistError> for ApiError {
    fn from(e: BlacklistError) -> Self {
        Self::Internal(e.to_string())
    }
}
