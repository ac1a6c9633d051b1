//! Delivery of the admitted notification to the user.

pub mod surface;

pub use surface::{
    AudioCue, NotificationSlot, PlaybackError, SurfaceConfig, SurfaceHandle, SurfacePhase, ToastRenderer, ToastSurface,
};
