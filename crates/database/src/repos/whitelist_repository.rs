//! Invitation whitelist repository.

use crate::types::StoreResult;
use sqlx::SqlitePool;

/// Allow-list of emails permitted to register or be auto-provisioned.
///
/// Entries are stored lowercase and every lookup lowercases its input, so
/// matching is case-insensitive end to end.
#[derive(Clone)]
pub struct WhitelistRepository {
    pool: SqlitePool,
}

impl WhitelistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn contains(&self, email: &str) -> StoreResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM whitelist WHERE email = ?")
            .bind(email.to_lowercase())
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Idempotent: adding an already-listed address changes nothing.
    pub async fn add(&self, email: &str) -> StoreResult<()> {
        sqlx::query("INSERT OR IGNORE INTO whitelist (email) VALUES (?)")
            .bind(email.to_lowercase())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Idempotent: removing an absent address is a no-op.
    pub async fn remove(&self, email: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM whitelist WHERE email = ?")
            .bind(email.to_lowercase())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list(&self) -> StoreResult<Vec<String>> {
        let emails: Vec<String> = sqlx::query_scalar("SELECT email FROM whitelist ORDER BY email")
            .fetch_all(&self.pool)
            .await?;

        Ok(emails)
    }
}
