//! Terminal rendition of the toast and the audio cue.
//!
//! The toast is printed as a framed block on stdout. Colors are only emitted
//! when stdout is a TTY.

use std::io::{self, Write};
use std::sync::Mutex;

use nestbook_domain::delivery::{AudioCue, PlaybackError, ToastRenderer};
use nestbook_domain::identity::ActorKind;
use nestbook_domain::notifications::{CurrentNotification, NotificationId};
use tracing::{debug, warn};

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";

fn accent(kind: ActorKind) -> &'static str {
    match kind {
        ActorKind::User => "\x1b[1;34m",
        ActorKind::Host => "\x1b[1;32m",
        ActorKind::Admin => "\x1b[1;35m",
        ActorKind::None => "\x1b[1m",
    }
}

/// Prints toasts to a writer, stdout by default.
pub struct TerminalToastRenderer {
    out: Mutex<Box<dyn Write + Send>>,
    ansi: bool,
}

impl TerminalToastRenderer {
    pub fn stdout() -> Self {
        Self::with_writer(Box::new(io::stdout()), atty::is(atty::Stream::Stdout))
    }

    pub fn with_writer(out: Box<dyn Write + Send>, ansi: bool) -> Self {
        Self {
            out: Mutex::new(out),
            ansi,
        }
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.ansi {
            format!("{}{}{}", style, text, RESET)
        } else {
            text.to_string()
        }
    }

    fn emit(&self, text: &str) {
        let mut out = match self.out.lock() {
            Ok(out) => out,
            Err(e) => {
                warn!("[TerminalToastRenderer] Output lock poisoned: {}", e);
                return;
            }
        };
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            warn!("[TerminalToastRenderer] Failed to write toast: {}", e);
        }
    }
}

impl std::fmt::Debug for TerminalToastRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalToastRenderer").field("ansi", &self.ansi).finish()
    }
}

impl ToastRenderer for TerminalToastRenderer {
    fn show(&self, notification: &CurrentNotification) {
        let record = &notification.record;
        let header = format!("[{} #{}] {}", notification.actor_kind, record.id, record.title);
        let mut block = format!("\n{}\n", self.paint(accent(notification.actor_kind), &header));
        if !record.message.is_empty() {
            block.push_str(&format!("  {}\n", record.message));
        }
        if let Some(created_at) = record.created_at {
            let stamp = created_at.format("%Y-%m-%d %H:%M UTC").to_string();
            block.push_str(&format!("  {}\n", self.paint(DIM, &stamp)));
        }
        self.emit(&block);
    }

    fn begin_hide(&self, id: NotificationId) {
        debug!("[TerminalToastRenderer] Fading out notification {}", id);
    }

    fn hide(&self, id: NotificationId) {
        self.emit(&format!("{}\n", self.paint(DIM, &format!("(notification #{} dismissed)", id))));
    }
}

/// Rings the terminal bell.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AudioCue for TerminalBell {
    fn play(&self) -> Result<(), PlaybackError> {
        if !atty::is(atty::Stream::Stdout) {
            return Err(PlaybackError::NoDevice);
        }
        let mut out = io::stdout();
        out.write_all(b"\x07")
            .and_then(|_| out.flush())
            .map_err(|e| PlaybackError::Failed(e.to_string()))
    }
}
