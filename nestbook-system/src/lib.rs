//! # Nestbook System Adapters (`nestbook-system`)
//!
//! Implementations of the ports declared by `nestbook-domain`:
//!
//! - [`HttpNotificationSource`]: the REST notification backend, over `reqwest`.
//! - [`SessionWatermarkStore`]: watermarks in a session-scoped JSON file.
//! - [`FileSessionRecordProvider`]: per-role session records on disk.
//! - [`TerminalToastRenderer`] and [`TerminalBell`]: delivery on the terminal.

pub mod error;
pub mod notification_client;
pub mod session_records;
pub mod session_storage;
pub mod terminal_surface;

pub use error::{SystemError, SystemResult};
pub use notification_client::HttpNotificationSource;
pub use session_records::FileSessionRecordProvider;
pub use session_storage::SessionWatermarkStore;
pub use terminal_surface::{TerminalBell, TerminalToastRenderer};
