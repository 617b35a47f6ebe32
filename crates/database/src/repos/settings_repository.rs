//! System settings repository.

use crate::types::StoreResult;
use sqlx::SqlitePool;

/// Singleton system flags. Currently a single maintenance switch; an absent
/// row reads as maintenance off.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn is_maintenance(&self) -> StoreResult<bool> {
        let maintenance: Option<bool> =
            sqlx::query_scalar("SELECT maintenance FROM settings WHERE id = 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(maintenance.unwrap_or(false))
    }

    pub async fn set_maintenance(&self, enabled: bool) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO settings (id, maintenance) VALUES (1, ?)
             ON CONFLICT(id) DO UPDATE SET maintenance = excluded.maintenance",
        )
        .bind(enabled)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
