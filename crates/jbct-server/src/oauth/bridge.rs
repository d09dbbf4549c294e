//! Shared sign-in flow run after any provider resolves a profile.

use std::sync::Arc;

use tracing::{info, instrument};

use super::{OAuthError, ProviderProfile};
use crate::auth::{IssuedToken, JwtManager, Principal};
use crate::storage::{DatabaseError, User, UserStore};

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error(transparent)]
    Profile(#[from] OAuthError),

    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error("Failed to sign session token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Result of a completed sign-in.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    /// Whether this login created the user row.
    pub created: bool,
    pub session: IssuedToken,
}

/// Resolves a provider profile to a stored user and signs a session for it.
#[derive(Clone)]
pub struct OAuthBridge {
    users: Arc<dyn UserStore>,
    jwt: Arc<JwtManager>,
}

impl OAuthBridge {
    pub fn new(users: Arc<dyn UserStore>, jwt: Arc<JwtManager>) -> Self {
        Self { users, jwt }
    }

    /// Find or create the user for `profile` and issue a session token.
    ///
    /// Nothing is signed if the profile lacks an email or the store fails.
    #[instrument(skip_all)]
    pub async fn complete_login(&self, profile: &ProviderProfile) -> Result<LoginOutcome, LoginError> {
        let new_user = profile.to_new_user()?;
        let (user, created) = self.users.find_or_create_by_email(&new_user).await?;

        let principal = principal_for(&user);
        let session = self.jwt.issue_session_token(&principal)?;

        info!(user_id = %user.id, created, "Login completed");
        Ok(LoginOutcome {
            user,
            created,
            session,
        })
    }
}

/// Session identity for a stored user.
pub fn principal_for(user: &User) -> Principal {
    Principal {
        user_id: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        picture: user.picture.clone(),
    }
}
