//! # Prepdesk Users Crate
//!
//! Accounts, authentication, and access control for the Prepdesk study
//! platform: invitation-gated registration, credential and two-factor login,
//! trial gating for student accounts, a system-wide maintenance switch, a
//! lazily-enforced session lifetime with a client-side idle watchdog, and
//! the administrative control surface.
//!
//! ## Architecture
//!
//! - **Services**: [`AuthService`] (the gateway), [`SessionManager`], and
//!   [`AdminService`]
//! - **Bootstrap**: first-run seeding of the configured admin account
//! - **Types**: outcomes, stats, and the error taxonomy
//! - **Utils**: password hashing, one-time codes, input validation
//!
//! Persistence lives in `prepdesk-database`; everything here is built from a
//! `SqlitePool` created by `initialize_database` at process start.

pub mod bootstrap;
pub mod services;
pub mod types;
pub mod utils;

// Re-export database types commonly needed alongside the services
pub use prepdesk_database::{
    initialize_database, DatabaseConnection, SafeUser, Session, StoreError, User, UserRole,
};

pub use services::{
    AdminService, AuthService, IdleWatchdog, SessionManager, HARD_TIMEOUT, IDLE_TIMEOUT,
    SESSION_CHECK_INTERVAL,
};
pub use types::{AuthError, AuthResult, LoginOutcome, SocialProvider, UsageStats};
