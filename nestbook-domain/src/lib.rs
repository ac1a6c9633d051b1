//! Domain layer of the Nestbook notification client.
//!
//! - [`identity`]: resolves the route and the per-role session records to one actor.
//! - [`notifications`]: polls the backend for that actor and decides, against
//!   an in-memory and a durable watermark, which notification to surface.
//! - [`delivery`]: the transient toast with its audio cue.
//! - [`pipeline`]: runs the three together.

pub use nestbook_core as core;

pub mod delivery;
pub mod error;
pub mod identity;
pub mod notifications;
pub mod pipeline;

pub use delivery::{AudioCue, SurfaceConfig, SurfaceHandle, SurfacePhase, ToastRenderer, ToastSurface};
pub use error::{DomainError, DomainResult};
pub use identity::{ActorDescriptor, ActorId, ActorKind, IdentityResolver, ResolutionRule, SessionRecordProvider};
pub use notifications::{
    CurrentNotification, InMemoryWatermarkStore, NotificationId, NotificationPoller, NotificationRecord,
    NotificationSource, PollerConfig, PollerHandle, PollerState, WatermarkKey, WatermarkStore,
};
pub use pipeline::{NotificationPipeline, PipelinePorts};
