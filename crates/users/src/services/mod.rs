//! Business logic layer.

pub mod admin_service;
pub mod auth_service;
pub mod session_service;

pub use admin_service::AdminService;
pub use auth_service::AuthService;
pub use session_service::{
    IdleWatchdog, SessionManager, HARD_TIMEOUT, IDLE_TIMEOUT, SESSION_CHECK_INTERVAL,
};
