//! Session entity definitions

use crate::entities::user::SafeUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session: a snapshot of the owner's safe view taken at
/// issue time, keyed by a server-issued opaque token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SafeUser,
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Age of the session relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.started_at
    }
}
