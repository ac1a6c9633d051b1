//! Notification polling for the active actor.
//!
//! - [`types`]: [`NotificationRecord`], [`CurrentNotification`] and [`WatermarkKey`].
//! - [`persistence_iface`]: the [`WatermarkStore`] and [`NotificationSource`] ports.
//! - [`persistence`]: [`InMemoryWatermarkStore`].
//! - [`engine`]: the watermark based admission decision ([`DedupEngine`]).
//! - [`service`]: the timer driven [`NotificationPoller`] task and its [`PollerHandle`].

pub mod engine;
pub mod errors;
pub mod persistence;
pub mod persistence_iface;
pub mod service;
pub mod types;

pub use engine::{Decision, DedupEngine, TickPhase};
pub use errors::{FetchError, PollerError, StoreError};
pub use persistence::InMemoryWatermarkStore;
pub use persistence_iface::{NotificationSource, WatermarkStore};
pub use service::{NotificationPoller, PollerConfig, PollerHandle, PollerState};
pub use types::{CurrentNotification, NotificationId, NotificationRecord, WatermarkKey};
