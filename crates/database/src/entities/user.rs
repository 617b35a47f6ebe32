//! User entity definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A full user record as stored in the user directory.
///
/// The password hash and the two-factor secret live only here and in the
/// repositories; everything crossing the service boundary is a [`SafeUser`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Opaque stable identifier, assigned once at creation.
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub two_factor_enabled: bool,
    /// Base64-encoded per-user TOTP secret, present iff 2FA is enrolled.
    pub two_factor_secret: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
    /// Module id to completion percent (0 to 100).
    pub progress: HashMap<String, u8>,
    /// Set only at student creation; later role changes leave it untouched.
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether the trial window has lapsed. Derived on every read, never
    /// persisted. Only meaningful for students; the login gate is role-aware.
    pub fn is_trial_expired(&self) -> bool {
        self.trial_ends_at.is_some_and(|ends| Utc::now() > ends)
    }

    /// Strip the credential material and stamp the derived trial state.
    pub fn safe_view(&self) -> SafeUser {
        SafeUser {
            id: self.id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            two_factor_enabled: self.two_factor_enabled,
            joined_at: self.joined_at,
            last_login_at: self.last_login_at,
            progress: self.progress.clone(),
            trial_ends_at: self.trial_ends_at,
            is_trial_expired: self.is_trial_expired(),
        }
    }
}

/// A user record with the credential material stripped, used for session
/// snapshots, admin listings, and API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    pub two_factor_enabled: bool,
    pub joined_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
    pub progress: HashMap<String, u8>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub is_trial_expired: bool,
}

/// User role enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Premium,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Premium => "premium",
            UserRole::Admin => "admin",
        }
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            "premium" => UserRole::Premium,
            "admin" => UserRole::Admin,
            _ => UserRole::Student,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
