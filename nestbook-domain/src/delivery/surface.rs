//! Transient toast for the current notification.
//!
//! The surface follows the poller's current-notification channel. A new
//! notification is rendered, announced with a one-shot audio cue and hidden
//! again after the display duration. Once the hide transition has run for
//! the grace period the surface asks the poller to clear the slot, naming
//! the notification it showed so that a newer one is never cleared.

use std::sync::Arc;
use std::time::Duration;

use nestbook_core::config::CoreConfig;
use nestbook_core::utils::spawn_task;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::notifications::{CurrentNotification, NotificationId, PollerHandle};

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("No audio output device is available.")]
    NoDevice,

    #[error("Audio playback failed: {0}")]
    Failed(String),
}

/// Draws the toast.
pub trait ToastRenderer: Send + Sync {
    fn show(&self, notification: &CurrentNotification);
    fn begin_hide(&self, id: NotificationId);
    fn hide(&self, id: NotificationId);
}

/// One-shot sound played when a toast appears.
pub trait AudioCue: Send + Sync {
    fn play(&self) -> Result<(), PlaybackError>;
}

/// Where the surface gets its input and sends its clear request.
pub trait NotificationSlot: Send + Sync {
    fn subscribe(&self) -> watch::Receiver<Option<CurrentNotification>>;

    /// Clears the slot if it still holds `id`.
    fn clear(&self, id: NotificationId);
}

impl NotificationSlot for PollerHandle {
    fn subscribe(&self) -> watch::Receiver<Option<CurrentNotification>> {
        self.subscribe_current()
    }

    fn clear(&self, id: NotificationId) {
        if let Err(e) = self.dismiss_if(id) {
            debug!("[ToastSurface] Could not clear notification {}: {}", id, e);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfig {
    pub display: Duration,
    pub hide_grace: Duration,
}

impl SurfaceConfig {
    pub fn from_core_config(config: &CoreConfig) -> Self {
        Self {
            display: config.delivery.display_duration(),
            hide_grace: config.delivery.hide_grace(),
        }
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::from_core_config(&CoreConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePhase {
    Hidden,
    Visible(NotificationId),
    /// The hide transition is running; the slot is cleared when it ends.
    Hiding(NotificationId),
}

enum SurfaceCommand {
    Close,
    Shutdown,
}

#[derive(Clone)]
pub struct SurfaceHandle {
    commands: mpsc::UnboundedSender<SurfaceCommand>,
    phase: watch::Receiver<SurfacePhase>,
}

impl SurfaceHandle {
    /// Explicit close: starts the hide transition without waiting for the timer.
    pub fn close(&self) {
        let _ = self.commands.send(SurfaceCommand::Close);
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(SurfaceCommand::Shutdown);
    }

    pub fn phase(&self) -> SurfacePhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<SurfacePhase> {
        self.phase.clone()
    }
}

pub struct ToastSurface {
    config: SurfaceConfig,
    slot: Arc<dyn NotificationSlot>,
    renderer: Arc<dyn ToastRenderer>,
    audio: Option<Arc<dyn AudioCue>>,
    phase: SurfacePhase,
    deadline: Option<Instant>,
    phase_tx: watch::Sender<SurfacePhase>,
    commands: mpsc::UnboundedReceiver<SurfaceCommand>,
}

impl ToastSurface {
    /// Spawns the surface task. Without `audio` toasts are shown silently.
    pub fn spawn(
        config: SurfaceConfig,
        slot: Arc<dyn NotificationSlot>,
        renderer: Arc<dyn ToastRenderer>,
        audio: Option<Arc<dyn AudioCue>>,
    ) -> (SurfaceHandle, JoinHandle<()>) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (phase_tx, phase) = watch::channel(SurfacePhase::Hidden);
        let surface = Self {
            config,
            slot,
            renderer,
            audio,
            phase: SurfacePhase::Hidden,
            deadline: None,
            phase_tx,
            commands,
        };
        let handle = SurfaceHandle {
            commands: commands_tx,
            phase,
        };
        (handle, spawn_task(surface.run()))
    }

    async fn run(mut self) {
        let mut input = self.slot.subscribe();
        let initial = input.borrow_and_update().clone();
        if let Some(notification) = initial {
            self.show(notification);
        }

        loop {
            tokio::select! {
                changed = input.changed() => {
                    if changed.is_err() {
                        debug!("[ToastSurface] Notification source closed.");
                        break;
                    }
                    let next = input.borrow_and_update().clone();
                    self.on_input(next);
                }
                command = self.commands.recv() => match command {
                    Some(SurfaceCommand::Close) => self.start_hide(),
                    Some(SurfaceCommand::Shutdown) | None => break,
                },
                _ = wait_until(self.deadline) => self.on_deadline(),
            }
        }

        self.hide_now();
        debug!("[ToastSurface] Stopped.");
    }

    fn on_input(&mut self, next: Option<CurrentNotification>) {
        match next {
            Some(notification) if self.phase == SurfacePhase::Visible(notification.id()) => {
                debug!("[ToastSurface] Notification {} is already visible.", notification.id());
            }
            Some(notification) => self.show(notification),
            // Cleared elsewhere (dismiss, actor switch) or by our own clear request.
            None => self.hide_now(),
        }
    }

    fn show(&mut self, notification: CurrentNotification) {
        let id = notification.id();
        self.renderer.show(&notification);
        if let Some(audio) = &self.audio {
            if let Err(e) = audio.play() {
                warn!("[ToastSurface] Audio cue for notification {} failed: {}", id, e);
            }
        }
        info!("[ToastSurface] Showing notification {} ({}).", id, notification.actor_kind);
        self.deadline = Some(Instant::now() + self.config.display);
        self.set_phase(SurfacePhase::Visible(id));
    }

    fn start_hide(&mut self) {
        if let SurfacePhase::Visible(id) = self.phase {
            self.renderer.begin_hide(id);
            self.deadline = Some(Instant::now() + self.config.hide_grace);
            self.set_phase(SurfacePhase::Hiding(id));
        }
    }

    fn on_deadline(&mut self) {
        match self.phase {
            SurfacePhase::Visible(_) => self.start_hide(),
            SurfacePhase::Hiding(id) => {
                self.slot.clear(id);
                self.hide_now();
            }
            SurfacePhase::Hidden => self.deadline = None,
        }
    }

    fn hide_now(&mut self) {
        self.deadline = None;
        if let SurfacePhase::Visible(id) | SurfacePhase::Hiding(id) = self.phase {
            self.renderer.hide(id);
            self.set_phase(SurfacePhase::Hidden);
        }
    }

    fn set_phase(&mut self, phase: SurfacePhase) {
        self.phase = phase;
        self.phase_tx.send_replace(phase);
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
