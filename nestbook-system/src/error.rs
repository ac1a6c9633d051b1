use nestbook_core::CoreError;
use nestbook_domain::notifications::StoreError;
use thiserror::Error;

/// A Result type for system adapter operations.
pub type SystemResult<T> = Result<T, SystemError>;

#[derive(Error, Debug)]
pub enum SystemError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidBackendUrl { url: String, reason: String },
    #[error("Failed to build the HTTP client: {0}")]
    HttpClient(String),
    #[error("Session storage at {path:?} is unusable: {reason}")]
    SessionStorage { path: std::path::PathBuf, reason: String },
    #[error("Session storage task failed: {0}")]
    StorageTask(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<SystemError> for StoreError {
    fn from(err: SystemError) -> Self {
        match err {
            SystemError::Core(core) => StoreError::backend("session storage", core),
            other => StoreError::backend_no_source("session storage", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestbook_core::ConfigError;

    #[test]
    fn test_system_error_converts_to_store_error() {
        let err: StoreError = SystemError::SessionStorage {
            path: "/run/user/1000/nestbook/session-storage.json".into(),
            reason: "not a JSON object".to_string(),
        }
        .into();
        assert!(err.to_string().contains("not a JSON object"));

        let core = CoreError::Config(ConfigError::ValidationError("boom".to_string()));
        let err: StoreError = SystemError::Core(core).into();
        assert!(matches!(err, StoreError::Backend { source: Some(_), .. }));
    }
}
