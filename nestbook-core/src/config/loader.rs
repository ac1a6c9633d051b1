//! Configuration Loading for Nestbook.
//!
//! [`ConfigLoader`] locates the configuration files, parses them as TOML,
//! applies defaults for anything missing, and validates the result.
//!
//! ## Configuration File Location
//!
//! [`ConfigLoader::load`] reads two optional files and merges them, the user
//! file taking precedence key by key:
//! 1. the system file, `/etc/nestbook/config.toml` (overridable through the
//!    `NESTBOOK_SYSTEM_CONFIG` environment variable);
//! 2. the user file, `config.toml` in the application config directory.
//!
//! [`ConfigLoader::load_from_path`] reads exactly one file and is what the
//! `--config` command line option uses. A file that does not exist yields the
//! default configuration in both cases.

use std::fs;
use std::path::Path;
use toml::Value;

use crate::config::CoreConfig;
use crate::error::{ConfigError, CoreError};
use crate::utils::fs as nest_fs;
use crate::utils::paths::{get_app_config_dir, get_app_state_dir, get_system_config_path_with_override};

/// Namespace for configuration loading logic.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads, merges and validates the system and user configuration files.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ReadError`] when a file exists but cannot be read.
    /// - [`ConfigError::ParseError`] when a file is not valid TOML or has unknown keys.
    /// - [`ConfigError::ValidationError`] when a value is out of range.
    /// - [`ConfigError::DirectoryUnavailable`] when the config directory cannot be determined.
    pub fn load() -> Result<CoreConfig, CoreError> {
        let system_value = Self::read_toml_value(&get_system_config_path_with_override())?;
        let user_value = Self::read_toml_value(&get_app_config_dir()?.join("config.toml"))?;

        let layered = [system_value, user_value].into_iter().flatten().reduce(overlay);
        let mut config = match layered {
            Some(value) => value.try_into::<CoreConfig>().map_err(ConfigError::ParseError)?,
            None => CoreConfig::default(),
        };
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    /// Loads and validates a single configuration file.
    pub fn load_from_path(path: &Path) -> Result<CoreConfig, CoreError> {
        let mut config = match Self::read_toml_value(path)? {
            Some(value) => value.try_into::<CoreConfig>().map_err(ConfigError::ParseError)?,
            None => CoreConfig::default(),
        };
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    /// Parses and validates configuration from an in-memory TOML string.
    pub fn load_from_str(content: &str) -> Result<CoreConfig, CoreError> {
        let mut config: CoreConfig = toml::from_str(content).map_err(ConfigError::ParseError)?;
        Self::validate_config(&mut config)?;
        Ok(config)
    }

    /// Reads a TOML file into a generic value. Missing or blank files yield `None`.
    fn read_toml_value(path: &Path) -> Result<Option<Value>, CoreError> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => {
                let value = content.parse::<Value>().map_err(ConfigError::ParseError)?;
                Ok(Some(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Configuration file {:?} not found, skipping", path);
                Ok(None)
            }
            Err(e) => Err(CoreError::Config(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            })),
        }
    }

    /// Validates the configuration and normalizes it in place.
    ///
    /// - log level and format are lowercased and checked;
    /// - a relative log file path is resolved against the application state directory
    ///   and its parent directory is created;
    /// - intervals and timeouts must be non-zero;
    /// - the backend URL must be http(s);
    /// - route prefixes must start with `/` and be pairwise distinct.
    pub(crate) fn validate_config(config: &mut CoreConfig) -> Result<(), CoreError> {
        let level_lower = config.logging.level.to_lowercase();
        match level_lower.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => config.logging.level = level_lower,
            _ => {
                return Err(validation_error(format!(
                    "Invalid log level: '{}'. Must be one of trace, debug, info, warn, error.",
                    config.logging.level
                )));
            }
        }

        let format_lower = config.logging.format.to_lowercase();
        match format_lower.as_str() {
            "text" | "json" => config.logging.format = format_lower,
            _ => {
                return Err(validation_error(format!(
                    "Invalid log format: '{}'. Must be one of text, json.",
                    config.logging.format
                )));
            }
        }

        if let Some(log_path) = &config.logging.file_path {
            let absolute_path = if log_path.is_absolute() {
                log_path.clone()
            } else {
                get_app_state_dir()?.join(log_path)
            };
            if let Some(parent_dir) = absolute_path.parent() {
                if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                    nest_fs::ensure_dir_exists(parent_dir)?;
                }
            }
            config.logging.file_path = Some(absolute_path);
        }

        let base_url = config.backend.base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(validation_error(format!(
                "Invalid backend base_url: '{}'. Must start with http:// or https://.",
                config.backend.base_url
            )));
        }
        config.backend.base_url = base_url;

        for (name, value) in [
            ("backend.fetch_timeout_ms", config.backend.fetch_timeout_ms),
            ("polling.interval_ms", config.polling.interval_ms),
            ("delivery.display_ms", config.delivery.display_ms),
        ] {
            if value == 0 {
                return Err(validation_error(format!("{} must be greater than zero.", name)));
            }
        }

        let routes = &mut config.routes;
        for prefix in [&mut routes.admin_prefix, &mut routes.host_prefix, &mut routes.user_prefix] {
            let trimmed = prefix.trim_end_matches('/');
            // An empty prefix would scope every path to one role.
            if !trimmed.starts_with('/') || trimmed.trim_start_matches('/').is_empty() {
                return Err(validation_error(format!(
                    "Invalid route prefix: '{}'. Must start with '/' and name a path segment.",
                    prefix
                )));
            }
            *prefix = trimmed.to_string();
        }
        if routes.admin_prefix == routes.host_prefix
            || routes.admin_prefix == routes.user_prefix
            || routes.host_prefix == routes.user_prefix
        {
            return Err(validation_error("Route prefixes must be distinct.".to_string()));
        }

        Ok(())
    }
}

fn validation_error(message: String) -> CoreError {
    CoreError::Config(ConfigError::ValidationError(message))
}

/// Layers `top` over `base`. Tables merge key by key; any other value in `top`
/// replaces what was below it, arrays included.
fn overlay(base: Value, top: Value) -> Value {
    match (base, top) {
        (Value::Table(mut lower), Value::Table(upper)) => {
            for (key, value) in upper {
                let merged = match lower.remove(&key) {
                    Some(below) => overlay(below, value),
                    None => value,
                };
                lower.insert(key, merged);
            }
            Value::Table(lower)
        }
        (_, top) => top,
    }
}
