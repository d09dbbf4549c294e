//! Credential store for the JBCT backend.
//!
//! Users are keyed by email. The first OAuth login for an email inserts a
//! row; later logins resolve to that row. Rows are never deleted.

mod db;
mod memory;
mod models;
mod queries;


use async_trait::async_trait;
use rand::RngExt;
use tracing::{debug, info};

pub use db::UserDatabase;
pub use jbct_core::db::DatabaseError;
pub use memory::MemoryUserStore;
pub use models::*;

/// Attempts at finding a free username before giving up.
pub const MAX_USERNAME_ATTEMPTS: usize = 5;

/// User lookup and creation.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Return the user owning `new_user.email`, creating it if absent.
    ///
    /// The flag is `true` when this call inserted the row. Concurrent calls
    /// for the same email resolve to a single row.
    async fn find_or_create_by_email(
        &self,
        new_user: &NewUser,
    ) -> Result<(User, bool), DatabaseError>;

    /// Get a user by ID.
    async fn get_user(&self, id: &str) -> Result<User, DatabaseError>;

    /// Get a user by email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Total number of users.
    async fn count_users(&self) -> Result<i64, DatabaseError>;
}

/// Row primitives [`find_or_create`] is built from.
#[async_trait]
pub(crate) trait UserRows: Send + Sync {
    /// Insert unless any unique key (id, email, username) is taken; `None`
    /// on conflict.
    async fn try_insert_user(
        &self,
        id: &str,
        username: &str,
        new_user: &NewUser,
    ) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
}

/// Find the user owning `new_user.email` or insert one.
///
/// An insert that loses on a unique key re-reads by email: a hit means a
/// concurrent login created the row, a miss means the username is taken and
/// the next candidate is tried.
pub(crate) async fn find_or_create<R: UserRows + ?Sized>(
    rows: &R,
    new_user: &NewUser,
) -> Result<(User, bool), DatabaseError> {
    if let Some(user) = rows.find_by_email(&new_user.email).await? {
        return Ok((user, false));
    }

    for attempt in 0..MAX_USERNAME_ATTEMPTS {
        let username = candidate_username(&new_user.username, attempt);

        if let Some(user) = rows.try_insert_user(&new_user_id(), &username, new_user).await? {
            info!(user_id = %user.id, username = %user.username, "User created");
            return Ok((user, true));
        }

        if let Some(user) = rows.find_by_email(&new_user.email).await? {
            debug!(user_id = %user.id, "Concurrent first login resolved to existing user");
            return Ok((user, false));
        }
        debug!(username = %username, attempt, "Username taken, retrying");
    }

    Err(DatabaseError::Conflict(format!(
        "no free username for {} after {MAX_USERNAME_ATTEMPTS} attempts",
        new_user.email
    )))
}

/// Fresh opaque user ID: a v4 uuid as 32 lowercase hex characters.
pub fn new_user_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Username to try on `attempt`; later attempts append a random suffix.
pub(crate) fn candidate_username(base: &str, attempt: usize) -> String {
    if attempt == 0 {
        return base.to_string();
    }
    let suffix: u16 = rand::rng().random_range(0..=u16::MAX);
    format!("{base}-{suffix:04x}")
}
