//! Postgres database for the credential store.

use jbct_core::config::PostgresConfig;
use jbct_core::db::{DatabaseError, open_pool};
use sqlx::{Pool, Postgres};
use tracing::info;

#[derive(Clone)]
pub struct UserDatabase {
    pool: Pool<Postgres>,
}

impl UserDatabase {
    /// Connect and bring the schema up to date.
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DatabaseError> {
        let pool = open_pool(config).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("Credential store migrations complete");
        Ok(())
    }

    pub const fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
