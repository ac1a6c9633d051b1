//! Default configuration values for Nestbook.
//!
//! These functions are used by `serde`'s `default` attribute in the configuration
//! structures to provide values that are not specified in the configuration file.

use crate::config::LoggingConfig;
use std::path::PathBuf;

pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        file_path: default_log_file_path(),
        format: default_log_format(),
    }
}

/// Returns the default log level string (`"info"`).
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// No log file by default.
pub(super) fn default_log_file_path() -> Option<PathBuf> {
    None
}

/// Returns the default log format string (`"text"`).
pub(super) fn default_log_format() -> String {
    "text".to_string()
}

pub(super) fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

pub(super) fn default_fetch_timeout_ms() -> u64 {
    10_000
}

/// One poll every ten seconds. This is the only interval setting; there is no
/// separate hard-coded override.
pub(super) fn default_poll_interval_ms() -> u64 {
    10_000
}

pub(super) fn default_display_ms() -> u64 {
    5_000
}

pub(super) fn default_hide_grace_ms() -> u64 {
    300
}

pub(super) fn default_audio_enabled() -> bool {
    true
}

pub(super) fn default_admin_prefix() -> String {
    "/admin".to_string()
}

pub(super) fn default_host_prefix() -> String {
    "/host".to_string()
}

pub(super) fn default_user_prefix() -> String {
    "/user".to_string()
}
