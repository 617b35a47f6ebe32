//! Response types crossing the service boundary.

use prepdesk_database::{SafeUser, Session};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Successful outcome of a credential check.
///
/// `TwoFactorRequired` is a control branch, not an error: the credentials
/// were correct, but no session exists until the one-time code is verified.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    LoggedIn { user: SafeUser, session: Session },
    TwoFactorRequired { user: SafeUser },
}

impl LoginOutcome {
    pub fn user(&self) -> &SafeUser {
        match self {
            LoginOutcome::LoggedIn { user, .. } => user,
            LoginOutcome::TwoFactorRequired { user } => user,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            LoginOutcome::LoggedIn { session, .. } => Some(session),
            LoginOutcome::TwoFactorRequired { .. } => None,
        }
    }
}

/// Identity providers supported for social login. The derived identity is
/// deterministic per provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialProvider {
    Google,
    Microsoft,
    Apple,
}

impl SocialProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialProvider::Google => "google",
            SocialProvider::Microsoft => "microsoft",
            SocialProvider::Apple => "apple",
        }
    }

    pub fn derived_email(&self) -> String {
        format!("user@{}.com", self.as_str())
    }

    pub fn derived_display_name(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} User", first.to_uppercase(), chars.as_str()),
            None => "User".to_string(),
        }
    }
}

impl fmt::Display for SocialProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Usage statistics for the admin surface, aggregated from live records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Unexpired sessions at the time of the query.
    pub active_users: i64,
    /// Active sessions as a percentage of the configured capacity.
    pub server_load_pct: u8,
    pub total_users: i64,
    pub premium_users: i64,
}
