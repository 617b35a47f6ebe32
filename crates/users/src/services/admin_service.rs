//! Administrative control panel: role changes, whitelist management, the
//! maintenance switch, and usage statistics.

use crate::services::SessionManager;
use crate::types::{AuthError, AuthResult, UsageStats};
use prepdesk_config::AuthConfig;
use prepdesk_database::{
    SafeUser, SettingsRepository, UserRepository, UserRole, WhitelistRepository,
};
use sqlx::SqlitePool;
use tracing::info;

const DEFAULT_SESSION_CAPACITY: u32 = 64;

/// Operates directly on the stores; intended for an administrative surface
/// that has already authenticated an admin session.
pub struct AdminService {
    users: UserRepository,
    whitelist: WhitelistRepository,
    settings: SettingsRepository,
    sessions: SessionManager,
    session_capacity: u32,
}

impl AdminService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            whitelist: WhitelistRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool.clone()),
            sessions: SessionManager::new(pool),
            session_capacity: DEFAULT_SESSION_CAPACITY,
        }
    }

    pub fn from_config(pool: SqlitePool, config: &AuthConfig) -> Self {
        let mut service = Self::new(pool);
        service.session_capacity = config.session_capacity;
        service
    }

    /// Every user as a safe view, trial expiry computed at read time.
    pub async fn list_users(&self) -> AuthResult<Vec<SafeUser>> {
        Ok(self.users.list().await?)
    }

    /// Change a user's role. Only the role column moves; in particular the
    /// trial timestamp is NOT recalculated, since the trial gate is already
    /// role-aware. Idempotent.
    pub async fn update_role(&self, email: &str, role: UserRole) -> AuthResult<()> {
        if !self.users.update_role(email, role).await? {
            return Err(AuthError::UserNotFound);
        }

        info!(email, role = %role, "user role updated");
        Ok(())
    }

    /// Flip the maintenance switch and return the new state.
    pub async fn toggle_maintenance(&self) -> AuthResult<bool> {
        let enabled = !self.settings.is_maintenance().await?;
        self.settings.set_maintenance(enabled).await?;

        info!(enabled, "maintenance mode toggled");
        Ok(enabled)
    }

    pub async fn add_to_whitelist(&self, email: &str) -> AuthResult<()> {
        self.whitelist.add(email).await?;
        info!(email, "address whitelisted");
        Ok(())
    }

    pub async fn remove_from_whitelist(&self, email: &str) -> AuthResult<()> {
        self.whitelist.remove(email).await?;
        info!(email, "address removed from whitelist");
        Ok(())
    }

    pub async fn whitelist(&self) -> AuthResult<Vec<String>> {
        Ok(self.whitelist.list().await?)
    }

    /// Usage statistics aggregated from live records: active users are the
    /// unexpired sessions, and the load gauge is that count against the
    /// configured capacity.
    pub async fn stats(&self) -> AuthResult<UsageStats> {
        let active_users = self.sessions.active_count().await?;
        let total_users = self.users.count().await?;
        let premium_users = self.users.count_by_role(UserRole::Premium).await?;

        let server_load_pct = if self.session_capacity == 0 {
            0
        } else {
            ((active_users.max(0) as u64 * 100) / u64::from(self.session_capacity)).min(100) as u8
        };

        Ok(UsageStats {
            active_users,
            server_load_pct,
            total_users,
            premium_users,
        })
    }
}
