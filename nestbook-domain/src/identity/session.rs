use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value;
use thiserror::Error;

use super::types::{ActorId, ActorKind};

#[derive(Debug, Error)]
pub enum SessionParseError {
    #[error("Session record for role '{kind}' is not valid JSON: {source}")]
    Malformed {
        kind: ActorKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Session record for role '{0}' is not a JSON object.")]
    NotAnObject(ActorKind),

    #[error("Session record for role '{0}' carries no usable identifier.")]
    MissingIdentifier(ActorKind),
}

/// A parsed session record: which role is signed in, and as whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub kind: ActorKind,
    pub actor_id: ActorId,
}

impl SessionRecord {
    /// Parses the raw blob stored for `kind`.
    ///
    /// The identifier is looked up under `id`, then `_id`, then the role
    /// specific key (`userId`, `hostId`, `adminId`). Strings must be
    /// non-blank after trimming; numbers are used in their decimal form.
    pub fn parse(kind: ActorKind, raw: &str) -> Result<Self, SessionParseError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|source| SessionParseError::Malformed { kind, source })?;
        let object = value.as_object().ok_or(SessionParseError::NotAnObject(kind))?;

        let role_key = format!("{}Id", kind.as_str());
        let actor_id = ["id", "_id", role_key.as_str()]
            .iter()
            .filter_map(|key| object.get(*key))
            .find_map(identifier_from_value)
            .ok_or(SessionParseError::MissingIdentifier(kind))?;

        Ok(Self { kind, actor_id })
    }
}

fn identifier_from_value(value: &Value) -> Option<ActorId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(ActorId::new(s.trim())),
        Value::Number(n) => Some(ActorId::new(n.to_string())),
        _ => None,
    }
}

/// Read access to the raw per-role session blobs.
///
/// Implementations return `None` for an absent record. A record that exists
/// but cannot be read is also reported as `None`; the implementation logs it.
pub trait SessionRecordProvider: Send + Sync {
    fn raw_record(&self, kind: ActorKind) -> Option<String>;
}

/// Session records held in memory, keyed by role.
#[derive(Debug, Default)]
pub struct InMemorySessionRecords {
    records: RwLock<HashMap<ActorKind, String>>,
}

impl InMemorySessionRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, kind: ActorKind, raw: impl Into<String>) -> Self {
        self.set(kind, raw);
        self
    }

    pub fn set(&self, kind: ActorKind, raw: impl Into<String>) {
        match self.records.write() {
            Ok(mut records) => {
                records.insert(kind, raw.into());
            }
            Err(e) => tracing::error!("[SessionRecords] Failed to acquire write lock: {}", e),
        }
    }

    pub fn clear(&self, kind: ActorKind) {
        match self.records.write() {
            Ok(mut records) => {
                records.remove(&kind);
            }
            Err(e) => tracing::error!("[SessionRecords] Failed to acquire write lock: {}", e),
        }
    }
}

impl SessionRecordProvider for InMemorySessionRecords {
    fn raw_record(&self, kind: ActorKind) -> Option<String> {
        match self.records.read() {
            Ok(records) => records.get(&kind).cloned(),
            Err(e) => {
                tracing::error!("[SessionRecords] Failed to acquire read lock: {}", e);
                None
            }
        }
    }
}
