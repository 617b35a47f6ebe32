//! Repository implementations over the SQLite pool.

use crate::types::{StoreError, StoreResult};
use chrono::{DateTime, Utc};

pub mod session_repository;
pub mod settings_repository;
pub mod user_repository;
pub mod whitelist_repository;

pub use session_repository::SessionRepository;
pub use settings_repository::SettingsRepository;
pub use user_repository::UserRepository;
pub use whitelist_repository::WhitelistRepository;

/// Timestamps are persisted as RFC 3339 TEXT columns.
pub(crate) fn parse_timestamp(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Serialization(format!("invalid timestamp {value:?}: {e}")))
}
