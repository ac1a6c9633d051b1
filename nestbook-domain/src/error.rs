//! Error module for the Nestbook domain layer.

use nestbook_core::CoreError;
use thiserror::Error;

pub use crate::delivery::PlaybackError;
pub use crate::identity::SessionParseError;
pub use crate::notifications::{FetchError, PollerError, StoreError};

/// A general Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// The primary error type for the domain layer.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Session(#[from] SessionParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Poller(#[from] PollerError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}
