use std::path::{Path, PathBuf};

use nestbook_core::config::SessionConfig;
use nestbook_core::utils::fs;
use nestbook_domain::identity::{ActorKind, SessionRecordProvider};
use tracing::{trace, warn};

use crate::error::SystemResult;

/// Session records kept as one file per role (`user.json`, `host.json`,
/// `admin.json`) in a directory that the sign-in flow writes to.
///
/// Files are read on every lookup, so signing in or out takes effect on the
/// next navigation without restarting the client.
#[derive(Debug, Clone)]
pub struct FileSessionRecordProvider {
    dir: PathBuf,
}

impl FileSessionRecordProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(session: &SessionConfig) -> SystemResult<Self> {
        Ok(Self::new(session.sessions_dir_or_default()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, kind: ActorKind) -> Option<PathBuf> {
        match kind {
            ActorKind::None => None,
            role => Some(self.dir.join(format!("{}.json", role.as_str()))),
        }
    }
}

impl SessionRecordProvider for FileSessionRecordProvider {
    fn raw_record(&self, kind: ActorKind) -> Option<String> {
        let path = self.record_path(kind)?;
        match fs::read_optional_to_string(&path) {
            Ok(Some(raw)) => Some(raw),
            Ok(None) => {
                trace!("[FileSessionRecordProvider] No session record at {:?}", path);
                None
            }
            Err(e) => {
                warn!("[FileSessionRecordProvider] Ignoring unreadable session record: {}", e);
                None
            }
        }
    }
}
