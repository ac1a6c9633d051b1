use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::notifications::errors::StoreError;
use crate::notifications::persistence_iface::WatermarkStore;
use crate::notifications::types::{NotificationId, WatermarkKey};

/// Watermark store that lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWatermarkStore {
    entries: Arc<RwLock<HashMap<String, NotificationId>>>,
}

impl InMemoryWatermarkStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Pre-populates `key`, as if an earlier run had written it.
    pub fn with_entry(self, key: &WatermarkKey, value: NotificationId) -> Self {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), value);
        }
        self
    }

    /// Copy of all stored entries, keyed by their rendered storage key.
    pub fn snapshot(&self) -> HashMap<String, NotificationId> {
        self.entries.read().map(|entries| entries.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WatermarkStore for InMemoryWatermarkStore {
    async fn read(&self, key: &WatermarkKey) -> Result<Option<NotificationId>, StoreError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| StoreError::Internal(format!("Failed to acquire read lock for watermarks: {}", e)))?;
        Ok(entries.get(&key.to_string()).copied())
    }

    async fn write(&self, key: &WatermarkKey, value: NotificationId) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| StoreError::Internal(format!("Failed to acquire write lock for watermarks: {}", e)))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
