use async_trait::async_trait;

use crate::identity::{ActorId, ActorKind};
use crate::notifications::errors::{FetchError, StoreError};
use crate::notifications::types::{NotificationId, NotificationRecord, WatermarkKey};

/// Durable, actor-scoped storage of the last accounted-for notification id.
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Reads the watermark stored under `key`.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when nothing was stored for the key yet.
    async fn read(&self, key: &WatermarkKey) -> Result<Option<NotificationId>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn write(&self, key: &WatermarkKey, value: NotificationId) -> Result<(), StoreError>;
}

/// Remote notification backend.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// Lists the notifications of one actor, newest first.
    ///
    /// # Arguments
    ///
    /// * `actor_id` - Identifier from the actor's session record.
    /// * `actor_kind` - Role of the actor; never [`ActorKind::None`].
    async fn list_notifications(
        &self,
        actor_id: &ActorId,
        actor_kind: ActorKind,
    ) -> Result<Vec<NotificationRecord>, FetchError>;

    /// Marks one notification as read on the backend.
    async fn mark_read(&self, id: NotificationId) -> Result<(), FetchError>;
}
