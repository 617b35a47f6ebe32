//! User directory repository.

use crate::entities::{SafeUser, User, UserRole};
use crate::repos::parse_timestamp;
use crate::types::StoreResult;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

/// Durable directory of user records keyed by email.
///
/// Password hashes and two-factor secrets never leave this type except via
/// [`UserRepository::find_by_email`], whose callers are the auth gateway and
/// the seeding routine.
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a full user record by email. Absence is `None`, not an error.
    pub async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT email, id, display_name, password_hash, role, two_factor_enabled,
                    two_factor_secret, joined_at, last_login_at, progress, trial_ends_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Create or overwrite a record. Read-modify-write: merging partial
    /// updates into an existing record is the caller's responsibility.
    pub async fn upsert(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT OR REPLACE INTO users
                (email, id, display_name, password_hash, role, two_factor_enabled,
                 two_factor_secret, joined_at, last_login_at, progress, trial_ends_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.id)
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(user.role.to_string())
        .bind(user.two_factor_enabled)
        .bind(&user.two_factor_secret)
        .bind(user.joined_at.to_rfc3339())
        .bind(user.last_login_at.to_rfc3339())
        .bind(serde_json::to_string(&user.progress)?)
        .bind(user.trial_ends_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List every user as a safe view: hashes and secrets stripped, trial
    /// expiry computed per entry at read time.
    pub async fn list(&self) -> StoreResult<Vec<SafeUser>> {
        let rows = sqlx::query(
            "SELECT email, id, display_name, password_hash, role, two_factor_enabled,
                    two_factor_secret, joined_at, last_login_at, progress, trial_ends_at
             FROM users ORDER BY joined_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| user_from_row(row).map(|user| user.safe_view()))
            .collect()
    }

    /// Merge a single module entry into the stored progress map without
    /// discarding other modules. Percent is clamped to 100.
    pub async fn merge_progress(
        &self,
        email: &str,
        module_id: &str,
        percent: u8,
    ) -> StoreResult<Option<User>> {
        let Some(mut user) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        user.progress.insert(module_id.to_string(), percent.min(100));

        sqlx::query("UPDATE users SET progress = ? WHERE email = ?")
            .bind(serde_json::to_string(&user.progress)?)
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(Some(user))
    }

    pub async fn update_last_login(&self, email: &str, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE email = ?")
            .bind(at.to_rfc3339())
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Mutate the role column only; trial fields are deliberately untouched.
    /// Returns whether a record was updated.
    pub async fn update_role(&self, email: &str, role: UserRole) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET role = ? WHERE email = ?")
            .bind(role.to_string())
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn count_by_role(&self, role: UserRole) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role.to_string())
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

fn user_from_row(row: &SqliteRow) -> StoreResult<User> {
    let role: String = row.try_get("role")?;
    let progress: String = row.try_get("progress")?;
    let joined_at: String = row.try_get("joined_at")?;
    let last_login_at: String = row.try_get("last_login_at")?;
    let trial_ends_at: Option<String> = row.try_get("trial_ends_at")?;

    Ok(User {
        email: row.try_get("email")?,
        id: row.try_get("id")?,
        display_name: row.try_get("display_name")?,
        password_hash: row.try_get("password_hash")?,
        role: UserRole::from(role.as_str()),
        two_factor_enabled: row.try_get("two_factor_enabled")?,
        two_factor_secret: row.try_get("two_factor_secret")?,
        joined_at: parse_timestamp(&joined_at)?,
        last_login_at: parse_timestamp(&last_login_at)?,
        progress: serde_json::from_str(&progress)?,
        trial_ends_at: trial_ends_at.as_deref().map(parse_timestamp).transpose()?,
    })
}
