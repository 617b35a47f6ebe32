//! First-run seeding.

use crate::types::AuthResult;
use crate::utils::password;
use chrono::Utc;
use prepdesk_config::AuthConfig;
use prepdesk_database::{User, UserRepository, UserRole, WhitelistRepository};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::info;

/// Seed the bootstrap admin on an empty user directory.
///
/// Does nothing when users already exist or when no bootstrap credentials
/// are configured. The admin starts without two-factor enrolled and is
/// whitelisted so the address could re-register if the account were ever
/// removed.
pub async fn seed_defaults(pool: &SqlitePool, config: &AuthConfig) -> AuthResult<()> {
    let users = UserRepository::new(pool.clone());

    if users.count().await? > 0 {
        return Ok(());
    }

    let (Some(email), Some(admin_password)) = (
        config.bootstrap_admin_email.as_deref(),
        config.bootstrap_admin_password.as_deref(),
    ) else {
        info!("no bootstrap admin configured, skipping seeding");
        return Ok(());
    };

    let now = Utc::now();
    let admin = User {
        id: cuid2::cuid(),
        email: email.to_string(),
        display_name: "System Administrator".to_string(),
        password_hash: password::hash_password(admin_password)?,
        role: UserRole::Admin,
        two_factor_enabled: false,
        two_factor_secret: None,
        joined_at: now,
        last_login_at: now,
        progress: HashMap::new(),
        trial_ends_at: None,
    };

    users.upsert(&admin).await?;
    WhitelistRepository::new(pool.clone()).add(email).await?;

    info!(email, "bootstrap admin seeded");
    Ok(())
}
