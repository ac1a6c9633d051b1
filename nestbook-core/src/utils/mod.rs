//! General Utilities for Nestbook Core.
//!
//! # Submodules
//!
//! - [`async_utils`]: task spawning and timeouts on the Tokio runtime.
//! - [`fs`]: directory creation, optional reads, atomic file replacement.
//! - [`paths`]: config, state and session runtime directories.

pub mod async_utils;
pub mod fs;
pub mod paths;

pub use async_utils::{spawn_task, timeout};
pub use fs::{ensure_dir_exists, read_optional_to_string, write_string_atomically};
