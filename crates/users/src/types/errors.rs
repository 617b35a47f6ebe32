//! Error taxonomy for the authentication core.

use prepdesk_database::StoreError;
use thiserror::Error;

/// Authentication and admin failures.
///
/// All of these are recoverable and user-facing; none are fatal to the
/// process, and none are retried automatically. Session expiry is not an
/// error at all: it manifests as `validate` returning `None`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("System is in maintenance mode")]
    MaintenanceActive,

    #[error("Trial period has expired")]
    TrialExpired,

    #[error("Invalid two-factor code")]
    InvalidCode,

    #[error("Email is not on the invitation whitelist")]
    NotInvited,

    #[error("Email already registered")]
    AlreadyExists,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AuthResult<T> = Result<T, AuthError>;
