//! Session-scoped watermark storage.
//!
//! All watermarks live in one JSON object file under the session runtime
//! directory, which the system clears when the login session ends. Every
//! write replaces the file atomically. Keys written by other components are
//! preserved.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nestbook_core::config::SessionConfig;
use nestbook_core::utils::fs;
use nestbook_domain::notifications::{NotificationId, StoreError, WatermarkKey, WatermarkStore};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, warn};

use crate::error::{SystemError, SystemResult};

type Entries = BTreeMap<String, Value>;

#[derive(Debug)]
pub struct SessionWatermarkStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl SessionWatermarkStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(session: &SessionConfig) -> Self {
        Self::new(session.storage_path_or_default())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WatermarkStore for SessionWatermarkStore {
    async fn read(&self, key: &WatermarkKey) -> Result<Option<NotificationId>, StoreError> {
        let path = self.path.clone();
        let entries = off_runtime(move || load_lenient(&path)).await?;
        let value = entries.get(&key.to_string()).and_then(Value::as_u64);
        debug!("[SessionWatermarkStore] read '{}' -> {:?}", key, value);
        Ok(value)
    }

    async fn write(&self, key: &WatermarkKey, value: NotificationId) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let entry = key.to_string();
        off_runtime(move || {
            let mut entries = load_lenient(&path)?;
            entries.insert(entry, Value::from(value));
            let content = serde_json::to_string_pretty(&entries).map_err(|e| SystemError::SessionStorage {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            fs::write_string_atomically(&path, &content)?;
            Ok(())
        })
        .await?;
        debug!("[SessionWatermarkStore] wrote '{}' = {}", key, value);
        Ok(())
    }
}

/// Runs blocking file IO on the blocking pool so the poller task never stalls on disk.
async fn off_runtime<T, F>(job: F) -> SystemResult<T>
where
    F: FnOnce() -> SystemResult<T> + Send + 'static,
    T: Send + 'static,
{
    task::spawn_blocking(job)
        .await
        .map_err(|e| SystemError::StorageTask(e.to_string()))?
}

fn load(path: &Path) -> SystemResult<Entries> {
    let Some(content) = fs::read_optional_to_string(path)? else {
        return Ok(Entries::new());
    };
    if content.trim().is_empty() {
        return Ok(Entries::new());
    }
    serde_json::from_str(&content).map_err(|e| SystemError::SessionStorage {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Like [`load`], but a corrupt file counts as empty.
fn load_lenient(path: &Path) -> SystemResult<Entries> {
    match load(path) {
        Err(e @ SystemError::SessionStorage { .. }) => {
            warn!("[SessionWatermarkStore] Discarding unreadable storage: {}", e);
            Ok(Entries::new())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestbook_domain::identity::ActorDescriptor;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn key(actor: ActorDescriptor) -> WatermarkKey {
        WatermarkKey::for_actor(&actor).unwrap()
    }

    #[tokio::test]
    async fn missing_file_reads_absent() {
        let dir = TempDir::new().unwrap();
        let store = SessionWatermarkStore::new(dir.path().join("session-storage.json"));

        assert_eq!(store.read(&key(ActorDescriptor::user("7"))).await.unwrap(), None);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn watermarks_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/session-storage.json");

        let store = SessionWatermarkStore::new(&path);
        store.write(&key(ActorDescriptor::user("7")), 9).await.unwrap();
        store.write(&key(ActorDescriptor::host("3")), 4).await.unwrap();
        store.write(&key(ActorDescriptor::user("7")), 11).await.unwrap();
        drop(store);

        let reopened = SessionWatermarkStore::new(&path);
        assert_eq!(reopened.read(&key(ActorDescriptor::user("7"))).await.unwrap(), Some(11));
        assert_eq!(reopened.read(&key(ActorDescriptor::host("3"))).await.unwrap(), Some(4));
        assert_eq!(reopened.read(&key(ActorDescriptor::admin("7"))).await.unwrap(), None);
    }

    #[tokio::test]
    async fn foreign_keys_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session-storage.json");
        std::fs::write(&path, r#"{"theme":"dark","lastSeenNotificationId_user_7":"oops"}"#).unwrap();
        let store = SessionWatermarkStore::new(&path);

        assert_eq!(store.read(&key(ActorDescriptor::user("7"))).await.unwrap(), None);
        store.write(&key(ActorDescriptor::user("7")), 3).await.unwrap();

        let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["lastSeenNotificationId_user_7"], 3);
    }

    #[tokio::test]
    async fn corrupt_file_is_treated_as_empty_and_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session-storage.json");
        std::fs::write(&path, "{ definitely not json").unwrap();
        let store = SessionWatermarkStore::new(&path);

        assert_eq!(store.read(&key(ActorDescriptor::user("7"))).await.unwrap(), None);
        store.write(&key(ActorDescriptor::user("7")), 5).await.unwrap();
        assert_eq!(store.read(&key(ActorDescriptor::user("7"))).await.unwrap(), Some(5));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn storage_io_does_not_block_the_runtime() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SessionWatermarkStore::new(dir.path().join("session-storage.json")));
        let (ticks_tx, mut ticks) = tokio::sync::mpsc::unbounded_channel();

        // On a single-threaded runtime this task only runs while the store awaits.
        let ticker = tokio::spawn(async move {
            loop {
                if ticks_tx.send(()).is_err() {
                    break;
                }
                tokio::task::yield_now().await;
            }
        });
        store.write(&key(ActorDescriptor::user("7")), 1).await.unwrap();
        ticker.abort();

        assert!(ticks.try_recv().is_ok(), "the runtime made no progress during the write");
        assert_eq!(store.read(&key(ActorDescriptor::user("7"))).await.unwrap(), Some(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_writes_keep_every_key() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SessionWatermarkStore::new(dir.path().join("session-storage.json")));

        let writes = (0..8u64).map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.write(&key(ActorDescriptor::user(i.to_string())), i).await })
        });
        for write in writes.collect::<Vec<_>>() {
            write.await.unwrap().unwrap();
        }

        for i in 0..8u64 {
            assert_eq!(store.read(&key(ActorDescriptor::user(i.to_string()))).await.unwrap(), Some(i));
        }
    }
}
