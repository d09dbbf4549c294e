//! Data models for the credential store.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub picture: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Profile fields for a user that may not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub picture: Option<String>,
}
