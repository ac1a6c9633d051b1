use std::time::Duration;

use nestbook_core::error::CoreError;
use thiserror::Error;

use crate::identity::ActorKind;

/// Failure of a remote notification operation. Never fatal: the poller logs
/// it and tries again on the next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Transport error while calling '{url}': {message}")]
    Transport { url: String, message: String },

    #[error("Backend answered {status} for '{url}'.")]
    Status { url: String, status: u16 },

    #[error("Could not decode the response from '{url}': {message}")]
    Decode { url: String, message: String },

    #[error("Request did not complete within {0:?}.")]
    Timeout(Duration),

    #[error("No active actor; cannot call the notification backend.")]
    NoActiveActor,

    #[error("Actor kind '{0}' has no notification endpoint.")]
    UnsupportedActor(ActorKind),
}

/// Failure of the durable watermark storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Watermark storage failed during '{operation}': {source_message}{}", .source.as_ref().map(|s| format!(": {}", s)).unwrap_or_default())]
    Backend {
        operation: String,
        source_message: String,
        #[source]
        source: Option<CoreError>,
    },

    #[error("Watermark storage holds invalid data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error in watermark storage: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn backend(operation: impl Into<String>, source: CoreError) -> Self {
        StoreError::Backend {
            operation: operation.into(),
            source_message: "storage backend error".to_string(),
            source: Some(source),
        }
    }

    pub fn backend_no_source(operation: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Backend {
            operation: operation.into(),
            source_message: message.into(),
            source: None,
        }
    }
}

/// Errors returned by [`PollerHandle`](super::service::PollerHandle) calls.
#[derive(Debug, Error)]
pub enum PollerError {
    #[error("The notification poller has stopped.")]
    Stopped,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
