//! Configuration for the Prepdesk backend.
//!
//! Configuration is assembled from three layers: compiled-in defaults, an
//! optional TOML file (`$PREPDESK_CONFIG` or one of the well-known
//! locations), and `PREPDESK__`-prefixed environment overrides.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "prepdesk.toml",
    "config/prepdesk.toml",
    "crates/config/prepdesk.toml",
    "../prepdesk.toml",
    "../config/prepdesk.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://prepdesk.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Length of the trial window granted to new student accounts, in days.
    pub trial_days: u32,
    /// Absolute session lifetime; sessions older than this are purged on read.
    pub hard_timeout_minutes: u64,
    /// Client-side inactivity countdown that forces a logout.
    pub idle_timeout_minutes: u64,
    /// Recommended polling interval for callers revalidating their session.
    pub session_check_interval_seconds: u64,
    /// Concurrent-session capacity used to derive the server load gauge.
    pub session_capacity: u32,
    /// First-run admin account; nothing is seeded when unset.
    pub bootstrap_admin_email: Option<String>,
    pub bootstrap_admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            trial_days: 14,
            hard_timeout_minutes: 60,
            idle_timeout_minutes: 15,
            session_check_interval_seconds: 60,
            session_capacity: 64,
            bootstrap_admin_email: None,
            bootstrap_admin_password: None,
        }
    }
}

/// Load the application configuration by combining defaults, files, and
/// environment overrides.
///
/// ```
/// use prepdesk_config::load;
///
/// std::env::remove_var("PREPDESK_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert_eq!(config.auth.trial_days, 14);
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = config::Config::try_from(&AppConfig::default())
        .context("unable to serialize default configuration")?;

    let mut builder = config::Config::builder().add_source(defaults);

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("PREPDESK_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via PREPDESK_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(config::Environment::with_prefix("PREPDESK").separator("__"));

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
