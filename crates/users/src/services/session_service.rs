//! Session lifecycle: issuance, lazy validation, invalidation, and the
//! client-side idle watchdog.

use crate::types::AuthResult;
use chrono::Utc;
use prepdesk_database::{SafeUser, Session, SessionRepository};
use sqlx::SqlitePool;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Absolute session lifetime. Sessions older than this are purged the next
/// time they are read; there is no background reaper.
pub const HARD_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Client-side inactivity countdown. Policy for the caller, not part of the
/// validation contract; see [`IdleWatchdog`].
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Recommended polling interval for callers revalidating their session.
/// Expiry is only ever detected on a `validate` call, so forced logout is
/// timely only if the caller polls at least this often.
pub const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Issues, validates, and invalidates sessions against the session table.
///
/// Validation is pull-based: the hard timeout is enforced lazily when a
/// token is presented, never by a timer.
#[derive(Clone)]
pub struct SessionManager {
    sessions: SessionRepository,
    hard_timeout: chrono::Duration,
}

impl SessionManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_hard_timeout(pool, HARD_TIMEOUT)
    }

    pub fn with_hard_timeout(pool: SqlitePool, hard_timeout: Duration) -> Self {
        Self {
            sessions: SessionRepository::new(pool),
            hard_timeout: chrono::Duration::seconds(hard_timeout.as_secs() as i64),
        }
    }

    /// Mint a token, stamp the start time, persist the safe-view snapshot,
    /// and return the new session.
    pub async fn issue(&self, user: &SafeUser) -> AuthResult<Session> {
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            user: user.clone(),
            started_at: Utc::now(),
        };

        self.sessions.insert(&session).await?;

        debug!(email = %user.email, "session issued");
        Ok(session)
    }

    /// Look up a session by token. Returns `None` for unknown tokens and for
    /// sessions past the hard timeout; an expired session is purged as a
    /// side effect of the read, forcing re-authentication.
    pub async fn validate(&self, token: &str) -> AuthResult<Option<Session>> {
        let Some(session) = self.sessions.find_by_token(token).await? else {
            return Ok(None);
        };

        if session.age(Utc::now()) > self.hard_timeout {
            self.sessions.delete_by_token(token).await?;
            info!(email = %session.user.email, "session hit hard timeout, forcing re-authentication");
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Remove the stored session unconditionally.
    pub async fn invalidate(&self, token: &str) -> AuthResult<()> {
        self.sessions.delete_by_token(token).await?;
        debug!("session invalidated");
        Ok(())
    }

    /// Number of sessions that would still pass validation right now.
    pub async fn active_count(&self) -> AuthResult<i64> {
        let cutoff = Utc::now() - self.hard_timeout;
        Ok(self.sessions.count_started_after(cutoff).await?)
    }

    /// Rewrite the progress view inside every live snapshot owned by the
    /// given user.
    pub async fn refresh_snapshot(&self, user: &SafeUser) -> AuthResult<()> {
        let refreshed = self.sessions.refresh_snapshot(user).await?;
        if refreshed > 0 {
            debug!(email = %user.email, refreshed, "session snapshots refreshed");
        }
        Ok(())
    }
}

/// Client-side inactivity timer.
///
/// Holds a countdown on a background task; [`touch`](IdleWatchdog::touch)
/// rearms it on any observed activity signal. When the countdown elapses the
/// supplied logout future runs exactly once. Dropping the watchdog cancels
/// the timer, so teardown and explicit logout both stop it.
pub struct IdleWatchdog {
    activity: mpsc::UnboundedSender<()>,
    handle: tokio::task::JoinHandle<()>,
}

impl IdleWatchdog {
    /// Start the countdown. `on_idle` should invalidate the session and run
    /// the caller's logout callback.
    pub fn spawn<F, Fut>(timeout: Duration, on_idle: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (activity, mut rx) = mpsc::unbounded_channel::<()>();

        let handle = tokio::spawn(async move {
            let mut on_idle = Some(on_idle);
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(timeout) => {
                        if let Some(on_idle) = on_idle.take() {
                            info!("idle timeout elapsed, forcing logout");
                            on_idle().await;
                        }
                        break;
                    }
                    signal = rx.recv() => {
                        // A dropped sender ends the watchdog; any message
                        // rearms the countdown.
                        if signal.is_none() {
                            break;
                        }
                    }
                }
            }
        });

        Self { activity, handle }
    }

    /// Report user activity, restarting the countdown.
    pub fn touch(&self) {
        let _ = self.activity.send(());
    }

    /// Stop the watchdog without firing the logout future.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for IdleWatchdog {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
