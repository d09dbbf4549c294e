//! In-memory credential store.

use std::collections::HashMap;

use async_trait::async_trait;
use jbct_core::db::{DatabaseError, unix_timestamp};
use tokio::sync::Mutex;

use super::models::{NewUser, User};
use super::{UserRows, UserStore, find_or_create};

/// Credential store held in memory, with the same uniqueness rules as the
/// Postgres table (unique id, email and username). The lock is held per row
/// operation, so concurrent logins race the way they do against Postgres.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRows for MemoryUserStore {
    async fn try_insert_user(
        &self,
        id: &str,
        username: &str,
        new_user: &NewUser,
    ) -> Result<Option<User>, DatabaseError> {
        let mut users = self.users.lock().await;
        let taken = users.contains_key(id)
            || users
                .values()
                .any(|u| u.email == new_user.email || u.username == username);
        if taken {
            return Ok(None);
        }

        let now = unix_timestamp();
        let user = User {
            id: id.to_string(),
            username: username.to_string(),
            email: new_user.email.clone(),
            picture: new_user.picture.clone(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id.clone(), user.clone());
        Ok(Some(user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.get_user_by_email(email).await
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_or_create_by_email(
        &self,
        new_user: &NewUser,
    ) -> Result<(User, bool), DatabaseError> {
        find_or_create(self, new_user).await
    }

    async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        self.users
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn count_users(&self) -> Result<i64, DatabaseError> {
        Ok(i64::try_from(self.users.lock().await.len()).unwrap_or(i64::MAX))
    }
}
