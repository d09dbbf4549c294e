//! Credential store queries.

use async_trait::async_trait;
use jbct_core::db::{DatabaseError, unix_timestamp};

use super::db::UserDatabase;
use super::models::{NewUser, User};
use super::{UserRows, UserStore, find_or_create};

const USER_COLUMNS: &str = "id, username, email, picture, created_at, updated_at";

#[async_trait]
impl UserRows for UserDatabase {
    async fn try_insert_user(
        &self,
        id: &str,
        username: &str,
        new_user: &NewUser,
    ) -> Result<Option<User>, DatabaseError> {
        let now = unix_timestamp();

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, username, email, picture, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             ON CONFLICT DO NOTHING \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(username)
        .bind(&new_user.email)
        .bind(&new_user.picture)
        .bind(now)
        .fetch_optional(self.pool())
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.get_user_by_email(email).await
    }
}

#[async_trait]
impl UserStore for UserDatabase {
    async fn find_or_create_by_email(
        &self,
        new_user: &NewUser,
    ) -> Result<(User, bool), DatabaseError> {
        find_or_create(self, new_user).await
    }

    async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(self.pool())
                .await?;
        Ok(user)
    }

    async fn count_users(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }
}
