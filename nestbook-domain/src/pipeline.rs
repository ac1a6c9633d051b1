//! Wiring of resolver, poller and surface into one running pipeline.

use std::sync::Arc;

use nestbook_core::CoreConfig;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::delivery::{AudioCue, SurfaceConfig, SurfaceHandle, ToastRenderer, ToastSurface};
use crate::error::DomainResult;
use crate::identity::{ActorDescriptor, IdentityResolver};
use crate::notifications::{NotificationPoller, NotificationSource, PollerConfig, PollerHandle, WatermarkStore};

/// The adapters a pipeline runs against.
pub struct PipelinePorts {
    pub source: Arc<dyn NotificationSource>,
    pub store: Arc<dyn WatermarkStore>,
    pub renderer: Arc<dyn ToastRenderer>,
    pub audio: Option<Arc<dyn AudioCue>>,
}

pub struct NotificationPipeline {
    resolver: IdentityResolver,
    poller: PollerHandle,
    surface: SurfaceHandle,
    tasks: Vec<JoinHandle<()>>,
}

impl NotificationPipeline {
    /// Starts the poller and the surface. Nothing is polled until the first [`navigate`](Self::navigate).
    pub fn start(
        poller_config: PollerConfig,
        surface_config: SurfaceConfig,
        resolver: IdentityResolver,
        ports: PipelinePorts,
    ) -> Self {
        let (poller, poller_task) = NotificationPoller::spawn(poller_config, ports.source, ports.store);
        let (surface, surface_task) =
            ToastSurface::spawn(surface_config, Arc::new(poller.clone()), ports.renderer, ports.audio);
        Self {
            resolver,
            poller,
            surface,
            tasks: vec![poller_task, surface_task],
        }
    }

    /// [`start`](Self::start) with the timings from `config`; audio is dropped when disabled there.
    pub fn from_core_config(config: &CoreConfig, resolver: IdentityResolver, mut ports: PipelinePorts) -> Self {
        if !config.delivery.audio_enabled {
            ports.audio = None;
        }
        Self::start(
            PollerConfig::from_core_config(config),
            SurfaceConfig::from_core_config(config),
            resolver,
            ports,
        )
    }

    /// Re-resolves the actor for `path` and hands it to the poller.
    pub fn navigate(&self, path: &str) -> DomainResult<ActorDescriptor> {
        let actor = self.resolver.resolve(path);
        self.poller.set_actor(actor.clone())?;
        Ok(actor)
    }

    pub fn poller(&self) -> &PollerHandle {
        &self.poller
    }

    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    /// Stops both tasks and waits for them.
    pub async fn shutdown(self) {
        self.surface.shutdown();
        if let Err(e) = self.poller.shutdown() {
            warn!("[NotificationPipeline] {}", e);
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("[NotificationPipeline] Task ended abnormally: {}", e);
            }
        }
        info!("[NotificationPipeline] Shut down.");
    }
}
