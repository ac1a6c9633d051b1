//! Configuration Management for Nestbook.
//!
//! - [`types`]: the configuration schema ([`CoreConfig`] and its sections).
//! - [`defaults`]: default values used when a key is missing.
//! - [`loader`]: [`ConfigLoader`], which finds, parses, merges and validates files.
//!
//! # Examples
//!
//! ```rust,ignore
//! use nestbook_core::config::ConfigLoader;
//!
//! match ConfigLoader::load() {
//!     Ok(config) => println!("Polling every {} ms", config.polling.interval_ms),
//!     Err(e) => {
//!         nestbook_core::logging::init_minimal_logging();
//!         tracing::error!("Configuration error: {}", e);
//!     }
//! }
//! ```

pub mod defaults;
pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::{BackendConfig, CoreConfig, DeliveryConfig, LoggingConfig, PollingConfig, RoutesConfig, SessionConfig};
