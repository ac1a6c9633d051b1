//! Application-Specific Path Resolution.
//!
//! Resolves the directories Nestbook reads from and writes to. It relies on
//! the `directories-next` crate.
//!
//! - [`get_app_config_dir()`]: e.g., `~/.config/nestbook`. Holds `config.toml` and,
//!   by default, the `sessions/` directory with the per-role session records.
//! - [`get_app_state_dir()`]: e.g., `~/.local/state/nestbook`. Relative log file paths
//!   are resolved against it.
//! - [`get_session_runtime_dir()`]: e.g., `/run/user/1000/nestbook`. Lives exactly as
//!   long as the login session, which makes it the home of session-scoped storage.
//!
//! Fallible functions return [`CoreError::Config(ConfigError::DirectoryUnavailable)`]
//! when the HOME directory cannot be found.

use directories_next::{BaseDirs, ProjectDirs};
use std::env;
use std::path::PathBuf;

use crate::error::{ConfigError, CoreError};

const QUALIFIER: &str = "app";
const ORGANIZATION: &str = "Nestbook";
const APPLICATION: &str = "nestbook";

/// Environment variable overriding the location of the system-wide config file.
pub const SYSTEM_CONFIG_ENV: &str = "NESTBOOK_SYSTEM_CONFIG";
const DEFAULT_SYSTEM_CONFIG_PATH: &str = "/etc/nestbook/config.toml";

fn project_dirs() -> Result<ProjectDirs, CoreError> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION).ok_or_else(|| {
        CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: "Application Project".to_string(),
        })
    })
}

/// Returns the application configuration directory.
///
/// # Errors
/// Returns [`CoreError::Config(ConfigError::DirectoryUnavailable)`] if the HOME
/// directory cannot be determined.
pub fn get_app_config_dir() -> Result<PathBuf, CoreError> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

/// Returns the application state directory.
///
/// On Linux this is `$XDG_STATE_HOME/nestbook` (default `~/.local/state/nestbook`).
/// `directories-next` has no state directory, so other platforms use the local
/// data directory instead.
pub fn get_app_state_dir() -> Result<PathBuf, CoreError> {
    let base_dirs = BaseDirs::new().ok_or_else(|| {
        CoreError::Config(ConfigError::DirectoryUnavailable {
            dir_type: "State Base".to_string(),
        })
    })?;

    #[cfg(target_os = "linux")]
    let base = match env::var("XDG_STATE_HOME") {
        Ok(state_home) if !state_home.is_empty() => PathBuf::from(state_home),
        _ => base_dirs.home_dir().join(".local/state"),
    };
    #[cfg(not(target_os = "linux"))]
    let base = base_dirs.data_local_dir().to_path_buf();

    Ok(base.join(APPLICATION))
}

/// Returns the directory for state that must not outlive the login session.
///
/// This is `$XDG_RUNTIME_DIR/nestbook`, which the session manager removes at
/// logout. Without a runtime directory the system temp directory is used, which
/// is only cleared on reboot.
pub fn get_session_runtime_dir() -> PathBuf {
    BaseDirs::new()
        .and_then(|dirs| dirs.runtime_dir().map(|p| p.to_path_buf()))
        .unwrap_or_else(env::temp_dir)
        .join(APPLICATION)
}

/// Returns the path of the system-wide configuration file.
///
/// The [`SYSTEM_CONFIG_ENV`] environment variable takes precedence over
/// `/etc/nestbook/config.toml`.
pub fn get_system_config_path_with_override() -> PathBuf {
    match env::var_os(SYSTEM_CONFIG_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(DEFAULT_SYSTEM_CONFIG_PATH),
    }
}
