//! Prepdesk Database Crate
//!
//! SQLite persistence for the Prepdesk authentication core: the user
//! directory, the session table, the invitation whitelist, and the singleton
//! system settings row. Connection management, embedded migrations, and the
//! repository implementations all live here.

use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::run_migrations;

// Re-export repositories
pub use repos::{SessionRepository, SettingsRepository, UserRepository, WhitelistRepository};

// Re-export entities
pub use entities::{
    session::Session,
    user::{SafeUser, User, UserRole},
};

// Re-export types
pub use types::{StoreError, StoreResult};

/// Initialize the database: prepare the connection and apply migrations.
pub async fn initialize_database(
    config: &prepdesk_config::DatabaseConfig,
) -> StoreResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prepdesk_config::DatabaseConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();

        let result: (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(result.0);
    }
}
