//! Authentication gateway: login, two-factor verification, registration,
//! social login, and the progress-update boundary.

use crate::services::SessionManager;
use crate::types::{AuthError, AuthResult, LoginOutcome, SocialProvider};
use crate::utils::{password, totp, validation};
use chrono::{Duration, Utc};
use prepdesk_config::AuthConfig;
use prepdesk_database::{
    SafeUser, Session, SettingsRepository, User, UserRepository, UserRole, WhitelistRepository,
};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{info, warn};

const TRIAL_DAYS: i64 = 14;
const SOCIAL_PASSWORD_LENGTH: usize = 32;

/// Orchestrates the credential stores and the session manager.
///
/// Built once at process start from the shared pool and handed to the UI
/// shell; there is no global state.
pub struct AuthService {
    users: UserRepository,
    whitelist: WhitelistRepository,
    settings: SettingsRepository,
    sessions: SessionManager,
    trial_days: i64,
}

impl AuthService {
    pub fn new(pool: SqlitePool) -> Self {
        let sessions = SessionManager::new(pool.clone());
        Self::with_session_manager(pool, sessions)
    }

    /// Build the gateway with timeouts and trial length from configuration.
    pub fn from_config(pool: SqlitePool, config: &AuthConfig) -> Self {
        let sessions = SessionManager::with_hard_timeout(
            pool.clone(),
            std::time::Duration::from_secs(config.hard_timeout_minutes * 60),
        );
        let mut service = Self::with_session_manager(pool, sessions);
        service.trial_days = i64::from(config.trial_days);
        service
    }

    pub fn with_session_manager(pool: SqlitePool, sessions: SessionManager) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            whitelist: WhitelistRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool),
            sessions,
            trial_days: TRIAL_DAYS,
        }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Check credentials and gate on maintenance mode and trial expiry.
    ///
    /// Accounts with two-factor enabled get a pending outcome and NO session;
    /// the session is only issued once [`verify_two_factor`] succeeds.
    ///
    /// [`verify_two_factor`]: AuthService::verify_two_factor
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        let Some(mut user) = self.users.find_by_email(email).await? else {
            return Err(AuthError::UserNotFound);
        };

        if !password::verify_password(password, &user.password_hash) {
            warn!(email = %user.email, "login rejected: bad password");
            return Err(AuthError::InvalidCredentials);
        }

        // Admins bypass the maintenance gate.
        if self.settings.is_maintenance().await? && user.role != UserRole::Admin {
            return Err(AuthError::MaintenanceActive);
        }

        // The trial gate applies to students only; premium and admin
        // accounts keep any stale trial timestamp without effect.
        if user.role == UserRole::Student && user.is_trial_expired() {
            return Err(AuthError::TrialExpired);
        }

        let now = Utc::now();
        self.users.update_last_login(&user.email, now).await?;
        user.last_login_at = now;

        let safe = user.safe_view();

        if user.two_factor_enabled {
            info!(email = %user.email, "two-factor challenge issued");
            return Ok(LoginOutcome::TwoFactorRequired { user: safe });
        }

        let session = self.sessions.issue(&safe).await?;
        info!(email = %user.email, "user logged in");
        Ok(LoginOutcome::LoggedIn { user: safe, session })
    }

    /// Complete a pending two-factor login. The code is checked as a TOTP
    /// against the user's enrolled secret; only a match issues a session.
    pub async fn verify_two_factor(&self, email: &str, code: &str) -> AuthResult<Session> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Err(AuthError::UserNotFound);
        };

        let Some(secret) = user.two_factor_secret.as_deref() else {
            // No secret enrolled means no code can ever match.
            return Err(AuthError::InvalidCode);
        };

        if !totp::verify(secret, code, Utc::now()) {
            warn!(email = %user.email, "two-factor verification failed");
            return Err(AuthError::InvalidCode);
        }

        let session = self.sessions.issue(&user.safe_view()).await?;
        info!(email = %user.email, "two-factor verification succeeded");
        Ok(session)
    }

    /// Invitation-gated registration. New accounts start as students with a
    /// fresh trial window and an active session.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> AuthResult<(SafeUser, Session)> {
        if !self.whitelist.contains(email).await? {
            return Err(AuthError::NotInvited);
        }

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::AlreadyExists);
        }

        validation::validate_email(email)?;
        validation::validate_password(password)?;
        validation::validate_display_name(name)?;

        let user = self
            .create_student(email, name, &password::hash_password(password)?)
            .await?;

        let safe = user.safe_view();
        let session = self.sessions.issue(&safe).await?;
        info!(email = %user.email, "user registered");
        Ok((safe, session))
    }

    /// Social login against a deterministic provider identity. Whitelisted
    /// identities without a record are auto-provisioned as trial students;
    /// existing students get the same trial gate as `login`.
    pub async fn social_login(
        &self,
        provider: SocialProvider,
    ) -> AuthResult<(SafeUser, Session)> {
        let email = provider.derived_email();

        if !self.whitelist.contains(&email).await? {
            return Err(AuthError::NotInvited);
        }

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => {
                if user.role == UserRole::Student && user.is_trial_expired() {
                    return Err(AuthError::TrialExpired);
                }
                user
            }
            None => {
                // Lock the account behind an unguessable password so the
                // provider identity stays the only way in.
                let placeholder =
                    password::generate_random_password(SOCIAL_PASSWORD_LENGTH);
                let user = self
                    .create_student(
                        &email,
                        &provider.derived_display_name(),
                        &password::hash_password(&placeholder)?,
                    )
                    .await?;
                info!(%email, %provider, "auto-provisioned social account");
                user
            }
        };

        let safe = user.safe_view();
        let session = self.sessions.issue(&safe).await?;
        info!(email = %safe.email, %provider, "social login succeeded");
        Ok((safe, session))
    }

    /// Resolve the session behind a token, if it is still live. This is the
    /// call the UI shell polls; expiry surfaces here as `None`.
    pub async fn current_user(&self, token: &str) -> AuthResult<Option<Session>> {
        self.sessions.validate(token).await
    }

    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        self.sessions.invalidate(token).await
    }

    /// Merge one module's completion percent into the user's progress map
    /// and refresh the progress view inside any live sessions they own.
    pub async fn update_progress(
        &self,
        email: &str,
        module_id: &str,
        percent: u8,
    ) -> AuthResult<SafeUser> {
        let Some(user) = self.users.merge_progress(email, module_id, percent).await? else {
            return Err(AuthError::UserNotFound);
        };

        let safe = user.safe_view();
        self.sessions.refresh_snapshot(&safe).await?;
        Ok(safe)
    }

    /// Enroll the user in two-factor login. Returns the fresh secret so the
    /// caller can hand it to an authenticator app.
    pub async fn enable_two_factor(&self, email: &str) -> AuthResult<String> {
        let Some(mut user) = self.users.find_by_email(email).await? else {
            return Err(AuthError::UserNotFound);
        };

        let secret = totp::generate_secret();
        user.two_factor_enabled = true;
        user.two_factor_secret = Some(secret.clone());
        self.users.upsert(&user).await?;

        info!(email = %user.email, "two-factor enabled");
        Ok(secret)
    }

    pub async fn disable_two_factor(&self, email: &str) -> AuthResult<()> {
        let Some(mut user) = self.users.find_by_email(email).await? else {
            return Err(AuthError::UserNotFound);
        };

        user.two_factor_enabled = false;
        user.two_factor_secret = None;
        self.users.upsert(&user).await?;

        info!(email = %user.email, "two-factor disabled");
        Ok(())
    }

    async fn create_student(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> AuthResult<User> {
        let now = Utc::now();
        let user = User {
            id: cuid2::cuid(),
            email: email.to_string(),
            display_name: name.to_string(),
            password_hash: password_hash.to_string(),
            role: UserRole::Student,
            two_factor_enabled: false,
            two_factor_secret: None,
            joined_at: now,
            last_login_at: now,
            progress: HashMap::new(),
            trial_ends_at: Some(now + Duration::days(self.trial_days)),
        };

        self.users.upsert(&user).await?;
        Ok(user)
    }
}
