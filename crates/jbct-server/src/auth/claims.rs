//! JWT claims carried by the session cookie.

use serde::{Deserialize, Serialize};

/// Claims embedded in session tokens.
///
/// `userId` is both written at sign time and read at verify time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

impl Claims {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            picture: self.picture.clone(),
        }
    }
}

/// The authenticated identity derived from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub picture: Option<String>,
}
