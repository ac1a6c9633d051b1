use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::{ActorDescriptor, ActorId, ActorKind};

/// Server-assigned, monotonically increasing notification identifier.
pub type NotificationId = u64;

/// One notification as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    #[serde(alias = "_id")]
    pub id: NotificationId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_read: bool,
    /// Missing on some legacy records; a record without it must not spoil the list.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NotificationRecord {
    pub fn new(id: NotificationId, title: impl Into<String>, message: impl Into<String>, is_read: bool) -> Self {
        Self {
            id,
            title: title.into(),
            message: message.into(),
            is_read,
            created_at: Some(Utc::now()),
        }
    }
}

/// The record currently admitted for display, with the actor kind as a styling hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentNotification {
    pub record: NotificationRecord,
    pub actor_kind: ActorKind,
}

impl CurrentNotification {
    pub fn id(&self) -> NotificationId {
        self.record.id
    }
}

/// Durable watermark key for one actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatermarkKey {
    kind: ActorKind,
    id: ActorId,
}

impl WatermarkKey {
    pub const PREFIX: &'static str = "lastSeenNotificationId";

    /// Key for `actor`, or `None` when no actor is active.
    pub fn for_actor(actor: &ActorDescriptor) -> Option<Self> {
        actor.id().map(|id| Self {
            kind: actor.kind(),
            id: id.clone(),
        })
    }

}

/// Renders as `lastSeenNotificationId_<kind>_<id>`.
impl fmt::Display for WatermarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", Self::PREFIX, self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_deserializes_from_backend_json() {
        let json = r#"{
            "_id": 12,
            "title": "Booking confirmed",
            "message": "Room 4 on Friday",
            "isRead": false,
            "createdAt": "2024-03-01T10:15:00Z"
        }"#;
        let record: NotificationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 12);
        assert_eq!(record.title, "Booking confirmed");
        assert!(!record.is_read);
        assert_eq!(record.created_at.map(|t| t.to_rfc3339()).as_deref(), Some("2024-03-01T10:15:00+00:00"));
    }

    #[test]
    fn record_optional_fields_default() {
        let record: NotificationRecord =
            serde_json::from_str(r#"{"id": 3, "createdAt": "2024-03-01T10:15:00Z"}"#).unwrap();
        assert_eq!(record.message, "");
        assert!(!record.is_read);
    }

    #[test]
    fn snapshot_with_undated_backlog_record_still_decodes() {
        let json = r#"[
            {"id": 9, "title": "New", "createdAt": "2024-03-02T09:00:00Z"},
            {"id": 4, "title": "Imported before timestamps existed"}
        ]"#;
        let records: Vec<NotificationRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![9, 4]);
        assert!(records[0].created_at.is_some());
        assert_eq!(records[1].created_at, None);
    }

    #[test]
    fn record_serializes_camel_case() {
        let value = serde_json::to_value(NotificationRecord::new(1, "t", "m", true)).unwrap();
        assert_eq!(value["isRead"], serde_json::Value::Bool(true));
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn watermark_key_is_scoped_by_kind_and_id() {
        let user = WatermarkKey::for_actor(&ActorDescriptor::user("7")).unwrap();
        let host = WatermarkKey::for_actor(&ActorDescriptor::host("7")).unwrap();
        assert_eq!(user.to_string(), "lastSeenNotificationId_user_7");
        assert_ne!(user, host);
        assert_eq!(WatermarkKey::for_actor(&ActorDescriptor::none()), None);
    }
}
