//! Configuration Data Structures for Nestbook.
//!
//! These structs are populated by deserializing `config.toml`. Every field has
//! a default (see [`super::defaults`]), so an empty file or a missing section
//! is valid, and `#[serde(deny_unknown_fields)]` rejects typos.
//!
//! # Key Structs
//! - [`CoreConfig`]: The root configuration structure.
//! - [`LoggingConfig`]: Log level, optional log file, output format.
//! - [`BackendConfig`]: Where the notification service lives and how long a fetch may take.
//! - [`PollingConfig`]: Poll cadence.
//! - [`DeliveryConfig`]: Toast timing and the audio cue switch.
//! - [`SessionConfig`]: Session record directory and the session-scoped storage file.
//! - [`RoutesConfig`]: Route prefixes of the role areas.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::defaults;
use crate::error::CoreError;
use crate::utils::paths;

/// Configuration settings for the logging subsystem.
///
/// # Examples
///
/// ```
/// use nestbook_core::config::LoggingConfig;
/// use std::path::PathBuf;
///
/// let default_log_config = LoggingConfig::default();
/// assert_eq!(default_log_config.level, "info");
/// assert_eq!(default_log_config.file_path, None);
/// assert_eq!(default_log_config.format, "text");
///
/// let toml_str = r#"
/// level = "debug"
/// file_path = "/var/log/nestbook.log"
/// format = "json"
/// "#;
/// let log_config: LoggingConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(log_config.level, "debug");
/// assert_eq!(log_config.file_path, Some(PathBuf::from("/var/log/nestbook.log")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level: "trace", "debug", "info", "warn" or "error" (case-insensitive).
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Optional log file. Relative paths are resolved against the application state directory.
    #[serde(default = "defaults::default_log_file_path")]
    pub file_path: Option<PathBuf>,
    /// "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Location of the remote notification service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the REST API, without a trailing slash (e.g. `http://localhost:5000/api`).
    #[serde(default = "defaults::default_base_url")]
    pub base_url: String,
    /// Upper bound for a single notification fetch, in milliseconds.
    #[serde(default = "defaults::default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

impl BackendConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::default_base_url(),
            fetch_timeout_ms: defaults::default_fetch_timeout_ms(),
        }
    }
}

/// Poll cadence of the notification engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollingConfig {
    #[serde(default = "defaults::default_poll_interval_ms")]
    pub interval_ms: u64,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: defaults::default_poll_interval_ms() }
    }
}

/// Timing of the transient toast.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// How long a toast stays fully visible.
    #[serde(default = "defaults::default_display_ms")]
    pub display_ms: u64,
    /// Length of the hide transition before the engine is told to clear.
    #[serde(default = "defaults::default_hide_grace_ms")]
    pub hide_grace_ms: u64,
    #[serde(default = "defaults::default_audio_enabled")]
    pub audio_enabled: bool,
}

impl DeliveryConfig {
    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    pub fn hide_grace(&self) -> Duration {
        Duration::from_millis(self.hide_grace_ms)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            display_ms: defaults::default_display_ms(),
            hide_grace_ms: defaults::default_hide_grace_ms(),
            audio_enabled: defaults::default_audio_enabled(),
        }
    }
}

/// Where session records are read from and where session-scoped state is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Directory holding `user.json`, `host.json` and `admin.json`.
    #[serde(default)]
    pub sessions_dir: Option<PathBuf>,
    /// File backing the session-scoped watermark store.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

impl SessionConfig {
    /// Configured session record directory, or `<app config dir>/sessions`.
    pub fn sessions_dir_or_default(&self) -> Result<PathBuf, CoreError> {
        match &self.sessions_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(paths::get_app_config_dir()?.join("sessions")),
        }
    }

    /// Configured storage file, or `<session runtime dir>/nestbook/session-storage.json`.
    pub fn storage_path_or_default(&self) -> PathBuf {
        match &self.storage_path {
            Some(path) => path.clone(),
            None => paths::get_session_runtime_dir().join("session-storage.json"),
        }
    }
}

/// Route prefixes that scope a path to one role area.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutesConfig {
    #[serde(default = "defaults::default_admin_prefix")]
    pub admin_prefix: String,
    #[serde(default = "defaults::default_host_prefix")]
    pub host_prefix: String,
    #[serde(default = "defaults::default_user_prefix")]
    pub user_prefix: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            admin_prefix: defaults::default_admin_prefix(),
            host_prefix: defaults::default_host_prefix(),
            user_prefix: defaults::default_user_prefix(),
        }
    }
}

/// Root configuration structure.
///
/// # Examples
///
/// ```
/// use nestbook_core::config::CoreConfig;
///
/// let toml_str = r#"
/// [logging]
/// level = "warn"
///
/// [polling]
/// interval_ms = 3000
/// "#;
/// let loaded: CoreConfig = toml::from_str(toml_str).unwrap();
/// assert_eq!(loaded.logging.level, "warn");
/// assert_eq!(loaded.polling.interval_ms, 3000);
/// assert_eq!(loaded.delivery.display_ms, 5000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
}
