//! Session table repository.

use crate::entities::{SafeUser, Session};
use crate::repos::parse_timestamp;
use crate::types::StoreResult;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// Persistence for authenticated sessions, keyed by their opaque token.
///
/// Expiry is a policy decision and lives in the session manager; this type
/// only stores, fetches, and deletes rows.
#[derive(Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, session: &Session) -> StoreResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO sessions (token, email, user_snapshot, started_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(&session.user.email)
        .bind(serde_json::to_string(&session.user)?)
        .bind(session.started_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_token(&self, token: &str) -> StoreResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT token, user_snapshot, started_at FROM sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let snapshot: String = row.try_get("user_snapshot")?;
        let started_at: String = row.try_get("started_at")?;

        Ok(Some(Session {
            token: row.try_get("token")?,
            user: serde_json::from_str(&snapshot)?,
            started_at: parse_timestamp(&started_at)?,
        }))
    }

    /// Idempotent: deleting an absent token is a no-op.
    pub async fn delete_by_token(&self, token: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Number of sessions started strictly after `cutoff`.
    pub async fn count_started_after(&self, cutoff: DateTime<Utc>) -> StoreResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE started_at > ?")
                .bind(cutoff.to_rfc3339())
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Rewrite the stored snapshot for every session owned by `user.email`.
    /// Returns the number of sessions refreshed.
    pub async fn refresh_snapshot(&self, user: &SafeUser) -> StoreResult<u32> {
        let result = sqlx::query("UPDATE sessions SET user_snapshot = ? WHERE email = ?")
            .bind(serde_json::to_string(user)?)
            .bind(&user.email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::initialize_database;
    use chrono::Duration;
    use prepdesk_config::DatabaseConfig;
    use std::collections::HashMap;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_sessions.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    fn create_test_session(token: &str, email: &str) -> Session {
        let now = Utc::now();
        Session {
            token: token.to_string(),
            user: SafeUser {
                id: format!("u_{email}"),
                email: email.to_string(),
                display_name: "Test User".to_string(),
                role: UserRole::Student,
                two_factor_enabled: false,
                joined_at: now,
                last_login_at: now,
                progress: HashMap::new(),
                trial_ends_at: Some(now + Duration::days(14)),
                is_trial_expired: false,
            },
            started_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = SessionRepository::new(pool);
        let session = create_test_session("tok_1", "test@example.com");

        repo.insert(&session).await.unwrap();

        let found = repo.find_by_token("tok_1").await.unwrap().unwrap();
        assert_eq!(found, session);

        assert!(repo.find_by_token("tok_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = SessionRepository::new(pool);
        let session = create_test_session("tok_1", "test@example.com");

        repo.insert(&session).await.unwrap();
        repo.delete_by_token("tok_1").await.unwrap();
        assert!(repo.find_by_token("tok_1").await.unwrap().is_none());

        // Deleting again is a no-op.
        repo.delete_by_token("tok_1").await.unwrap();
    }

    #[tokio::test]
    async fn test_count_started_after() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = SessionRepository::new(pool.clone());

        repo.insert(&create_test_session("tok_1", "a@example.com")).await.unwrap();
        repo.insert(&create_test_session("tok_2", "b@example.com")).await.unwrap();

        // Back-date one session past the cutoff.
        let stale = (Utc::now() - Duration::hours(2)).to_rfc3339();
        sqlx::query("UPDATE sessions SET started_at = ? WHERE token = ?")
            .bind(&stale)
            .bind("tok_1")
            .execute(&pool)
            .await
            .unwrap();

        let cutoff = Utc::now() - Duration::hours(1);
        assert_eq!(repo.count_started_after(cutoff).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_refresh_snapshot_targets_owner_only() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = SessionRepository::new(pool);

        repo.insert(&create_test_session("tok_1", "a@example.com")).await.unwrap();
        repo.insert(&create_test_session("tok_2", "a@example.com")).await.unwrap();
        repo.insert(&create_test_session("tok_3", "b@example.com")).await.unwrap();

        let mut snapshot = create_test_session("tok_1", "a@example.com").user;
        snapshot.progress.insert("m1".to_string(), 55);

        let refreshed = repo.refresh_snapshot(&snapshot).await.unwrap();
        assert_eq!(refreshed, 2);

        let updated = repo.find_by_token("tok_2").await.unwrap().unwrap();
        assert_eq!(updated.user.progress.get("m1"), Some(&55));

        let untouched = repo.find_by_token("tok_3").await.unwrap().unwrap();
        assert!(untouched.user.progress.is_empty());
    }
}
