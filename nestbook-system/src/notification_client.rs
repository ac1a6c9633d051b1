//! HTTP client for the notification backend.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET  notifications/{kind}/{actorId}`: the actor's notifications, newest first.
//! - `PATCH notifications/{id}/read`: marks one notification as read.

use std::time::Duration;

use async_trait::async_trait;
use nestbook_core::config::BackendConfig;
use nestbook_domain::identity::{ActorId, ActorKind};
use nestbook_domain::notifications::{FetchError, NotificationId, NotificationRecord, NotificationSource};
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{SystemError, SystemResult};

#[derive(Debug, Clone)]
pub struct HttpNotificationSource {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpNotificationSource {
    /// Creates a client for `base_url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// [`SystemError::InvalidBackendUrl`] when the URL does not parse or is
    /// not `http`/`https`, [`SystemError::HttpClient`] when the client cannot
    /// be built.
    pub fn new(base_url: &str, timeout: Duration) -> SystemResult<Self> {
        let invalid = |reason: String| SystemError::InvalidBackendUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base_url.scheme())));
        }
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SystemError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn from_config(backend: &BackendConfig) -> SystemResult<Self> {
        Self::new(&backend.base_url, backend.fetch_timeout())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn list_url(&self, actor_id: &ActorId, actor_kind: ActorKind) -> Result<Url, FetchError> {
        match actor_kind {
            ActorKind::None => Err(FetchError::UnsupportedActor(actor_kind)),
            kind => Ok(self.endpoint(&["notifications", kind.as_str(), actor_id.as_str()])),
        }
    }

    fn transport_error(&self, url: &Url, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl NotificationSource for HttpNotificationSource {
    async fn list_notifications(
        &self,
        actor_id: &ActorId,
        actor_kind: ActorKind,
    ) -> Result<Vec<NotificationRecord>, FetchError> {
        let url = self.list_url(actor_id, actor_kind)?;
        debug!("[HttpNotificationSource] GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Vec<NotificationRecord>>().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            } else {
                self.transport_error(&url, e)
            }
        })
    }

    async fn mark_read(&self, id: NotificationId) -> Result<(), FetchError> {
        let id = id.to_string();
        let url = self.endpoint(&["notifications", id.as_str(), "read"]);
        debug!("[HttpNotificationSource] PATCH {}", url);

        let response = self
            .client
            .patch(url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(&url, e))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}
