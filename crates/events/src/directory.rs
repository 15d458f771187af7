//! Read-only access to the identity directory.
//!
//! [`DirectoryReader`] is the seam between the fan-out engine and wherever
//! identities are stored. [`PgDirectory`] is the production implementation
//! over the `users` table; tests substitute in-memory readers.

use async_trait::async_trait;
use tigersafe_core::identity::Identity;
use tigersafe_core::types::DbId;
use tigersafe_db::repositories::UserRepo;
use tigersafe_db::DbPool;

/// Error type for directory reads.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The backing database query failed.
    #[error("Directory query failed: {0}")]
    Database(#[from] sqlx::Error),

    /// The directory cannot serve reads at all (e.g. its pool was shut down).
    #[error("Directory unavailable: {0}")]
    Unavailable(String),
}

/// Lookup operations the fan-out engine needs. No writes.
#[async_trait]
pub trait DirectoryReader: Send + Sync {
    /// Fetch one identity, or `None` if the id is unknown.
    async fn get_identity(&self, id: DbId) -> Result<Option<Identity>, DirectoryError>;

    /// Fetch every identity, in the directory's iteration order.
    async fn list_identities(&self) -> Result<Vec<Identity>, DirectoryError>;

    /// Cheap reachability check used by the health endpoint.
    async fn health_check(&self) -> Result<(), DirectoryError> {
        Ok(())
    }
}

/// [`DirectoryReader`] backed by the Postgres `users` table.
#[derive(Clone)]
pub struct PgDirectory {
    pool: DbPool,
}

impl PgDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DirectoryReader for PgDirectory {
    async fn get_identity(&self, id: DbId) -> Result<Option<Identity>, DirectoryError> {
        let user = UserRepo::find_by_id(&self.pool, id).await?;
        Ok(user.map(|u| u.into_identity()))
    }

    async fn list_identities(&self) -> Result<Vec<Identity>, DirectoryError> {
        let users = UserRepo::list(&self.pool).await?;
        Ok(users.into_iter().map(|u| u.into_identity()).collect())
    }

    async fn health_check(&self) -> Result<(), DirectoryError> {
        if self.pool.is_closed() {
            return Err(DirectoryError::Unavailable(
                "connection pool is closed".to_string(),
            ));
        }
        tigersafe_db::health_check(&self.pool).await?;
        Ok(())
    }
}
