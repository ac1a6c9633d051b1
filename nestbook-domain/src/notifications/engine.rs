//! Admission decision for one poll result.
//!
//! Only the newest record of a snapshot takes part. The in-memory watermark
//! is authoritative once established; the durable one is read once per
//! actor (cold start) and mirrors the in-memory value from then on.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::notifications::persistence_iface::WatermarkStore;
use crate::notifications::types::{NotificationId, NotificationRecord, WatermarkKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    ColdStart,
    Warm,
}

/// Result of evaluating one non-empty snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub phase: TickPhase,
    /// In-memory watermark after the evaluation.
    pub watermark: NotificationId,
    /// The record to surface, if any.
    pub admitted: Option<NotificationRecord>,
}

/// Dedup state for the active actor.
pub struct DedupEngine {
    store: Arc<dyn WatermarkStore>,
    watermark: Option<NotificationId>,
}

impl DedupEngine {
    pub fn new(store: Arc<dyn WatermarkStore>) -> Self {
        Self { store, watermark: None }
    }

    /// The in-memory watermark, `None` before the first evaluation.
    pub fn watermark(&self) -> Option<NotificationId> {
        self.watermark
    }

    /// Forgets the in-memory watermark so the next evaluation is a cold start.
    pub fn reset(&mut self) {
        self.watermark = None;
    }

    /// Runs the admission decision for `snapshot` (newest first).
    ///
    /// Returns `None` for an empty snapshot. Store failures never abort the
    /// decision: a failed read counts as absent and a failed write is logged.
    pub async fn evaluate(&mut self, key: &WatermarkKey, snapshot: &[NotificationRecord]) -> Option<Decision> {
        let newest = snapshot.first()?;

        let decision = match self.watermark {
            None => self.cold_start(key, newest).await,
            Some(current) => self.warm_tick(key, newest, current).await,
        };
        debug!(
            "[DedupEngine] {:?} for '{}': newest {}, watermark {}, admitted {:?}",
            decision.phase,
            key,
            newest.id,
            decision.watermark,
            decision.admitted.as_ref().map(|r| r.id)
        );
        Some(decision)
    }

    async fn cold_start(&mut self, key: &WatermarkKey, newest: &NotificationRecord) -> Decision {
        let persisted = match self.store.read(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("[DedupEngine] Reading durable watermark '{}' failed, treating it as absent: {}", key, e);
                None
            }
        };

        let watermark = newest.id.max(persisted.unwrap_or(0));
        self.watermark = Some(watermark);

        let admitted = match persisted {
            // First poll for this actor in this session: record, never replay.
            None => {
                self.persist(key, watermark).await;
                None
            }
            Some(persisted) => {
                if watermark > persisted {
                    self.persist(key, watermark).await;
                }
                (newest.id > persisted && !newest.is_read).then(|| newest.clone())
            }
        };

        Decision {
            phase: TickPhase::ColdStart,
            watermark,
            admitted,
        }
    }

    async fn warm_tick(&mut self, key: &WatermarkKey, newest: &NotificationRecord, current: NotificationId) -> Decision {
        if newest.id <= current {
            return Decision {
                phase: TickPhase::Warm,
                watermark: current,
                admitted: None,
            };
        }

        self.watermark = Some(newest.id);
        self.persist(key, newest.id).await;
        Decision {
            phase: TickPhase::Warm,
            watermark: newest.id,
            admitted: (!newest.is_read).then(|| newest.clone()),
        }
    }

    async fn persist(&self, key: &WatermarkKey, value: NotificationId) {
        if let Err(e) = self.store.write(key, value).await {
            warn!("[DedupEngine] Writing durable watermark '{}' = {} failed: {}", key, value, e);
        }
    }
}
