//! # Nestbook Core Library (`nestbook-core`)
//!
//! Foundation shared by the Nestbook notification client crates:
//!
//! - **Error Handling**: [`CoreError`] and the specific [`ConfigError`] and [`LoggingError`].
//! - **Configuration**: TOML configuration loaded and validated by [`ConfigLoader`]
//!   into [`CoreConfig`].
//! - **Logging**: `tracing` subscriber setup with console and optional file output.
//! - **Utilities**: filesystem helpers (atomic replace), path resolution for the
//!   config, state and session runtime directories, and Tokio helpers.
//!
//! ```rust,ignore
//! use nestbook_core::config::ConfigLoader;
//! use nestbook_core::logging::init_logging;
//! use nestbook_core::error::CoreError;
//!
//! fn main() -> Result<(), CoreError> {
//!     let core_config = ConfigLoader::load()?;
//!     init_logging(&core_config.logging)?;
//!     tracing::info!("Nestbook core initialized.");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

pub use config::{ConfigLoader, CoreConfig, LoggingConfig};
pub use error::{ConfigError, CoreError, LoggingError};
pub use logging::{init_logging, init_minimal_logging};
pub use utils::{spawn_task, timeout};
