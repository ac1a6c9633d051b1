//! The polling engine.
//!
//! A single task owns every piece of poller state. Route changes, dismissals
//! and mark-read requests reach it as commands and are serialized with timer
//! ticks, fetch completions and mark-read completions inside one `select!`
//! loop. Backend calls run as futures polled by that loop, never inline. Outputs
//! are published on `watch` channels read through [`PollerHandle`].

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use nestbook_core::config::CoreConfig;
use nestbook_core::utils::{spawn_task, timeout};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::identity::ActorDescriptor;
use crate::notifications::engine::{Decision, DedupEngine};
use crate::notifications::errors::{FetchError, PollerError};
use crate::notifications::persistence_iface::{NotificationSource, WatermarkStore};
use crate::notifications::types::{CurrentNotification, NotificationId, NotificationRecord, WatermarkKey};

/// Lifecycle of the poller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerState {
    /// No actor has been supplied yet.
    Idle,
    Polling(ActorDescriptor),
    /// The resolver found no active session.
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    pub interval: Duration,
    pub fetch_timeout: Duration,
}

impl PollerConfig {
    pub fn from_core_config(config: &CoreConfig) -> Self {
        Self {
            interval: config.polling.interval(),
            fetch_timeout: config.backend.fetch_timeout(),
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::from_core_config(&CoreConfig::default())
    }
}

enum PollerCommand {
    SetActor(ActorDescriptor),
    /// Clears the current notification; with an id, only if it is still that one.
    Dismiss(Option<NotificationId>),
    MarkRead {
        id: NotificationId,
        reply: oneshot::Sender<Result<(), FetchError>>,
    },
    Refresh,
    Shutdown,
}

/// Cloneable access to a running [`NotificationPoller`].
///
/// The poller stops once [`PollerHandle::shutdown`] is called or every handle is dropped.
#[derive(Clone)]
pub struct PollerHandle {
    commands: mpsc::UnboundedSender<PollerCommand>,
    current: watch::Receiver<Option<CurrentNotification>>,
    notifications: watch::Receiver<Vec<NotificationRecord>>,
    state: watch::Receiver<PollerState>,
}

impl PollerHandle {
    fn send(&self, command: PollerCommand) -> Result<(), PollerError> {
        self.commands.send(command).map_err(|_| PollerError::Stopped)
    }

    /// Switches the poller to `actor`. A descriptor equal to the active one is ignored.
    pub fn set_actor(&self, actor: ActorDescriptor) -> Result<(), PollerError> {
        self.send(PollerCommand::SetActor(actor))
    }

    pub fn dismiss(&self) -> Result<(), PollerError> {
        self.send(PollerCommand::Dismiss(None))
    }

    /// Clears the current notification only while it is still `id`.
    pub fn dismiss_if(&self, id: NotificationId) -> Result<(), PollerError> {
        self.send(PollerCommand::Dismiss(Some(id)))
    }

    /// Starts a fetch now unless one is already in flight.
    pub fn refresh(&self) -> Result<(), PollerError> {
        self.send(PollerCommand::Refresh)
    }

    /// Marks `id` as read on the backend and in the cached list.
    ///
    /// Watermarks are left untouched.
    ///
    /// # Errors
    ///
    /// [`PollerError::Fetch`] when no actor is active or the backend call
    /// fails, [`PollerError::Stopped`] when the poller is gone.
    pub async fn mark_read(&self, id: NotificationId) -> Result<(), PollerError> {
        let (reply, response) = oneshot::channel();
        self.send(PollerCommand::MarkRead { id, reply })?;
        let result = response.await.map_err(|_| PollerError::Stopped)?;
        result.map_err(PollerError::from)
    }

    pub fn shutdown(&self) -> Result<(), PollerError> {
        self.send(PollerCommand::Shutdown)
    }

    pub fn current_notification(&self) -> Option<CurrentNotification> {
        self.current.borrow().clone()
    }

    pub fn subscribe_current(&self) -> watch::Receiver<Option<CurrentNotification>> {
        self.current.clone()
    }

    /// The most recent list fetched for the active actor, newest first.
    pub fn notifications(&self) -> Vec<NotificationRecord> {
        self.notifications.borrow().clone()
    }

    pub fn state(&self) -> PollerState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<PollerState> {
        self.state.clone()
    }
}

type FetchOutcome = (ActorDescriptor, Result<Vec<NotificationRecord>, FetchError>);

struct MarkReadOutcome {
    actor: ActorDescriptor,
    id: NotificationId,
    reply: oneshot::Sender<Result<(), FetchError>>,
    result: Result<(), FetchError>,
}

pub struct NotificationPoller {
    config: PollerConfig,
    source: Arc<dyn NotificationSource>,
    dedup: DedupEngine,
    state: PollerState,
    ticker: Option<Interval>,
    in_flight: Option<BoxFuture<'static, FetchOutcome>>,
    pending_reads: FuturesUnordered<BoxFuture<'static, MarkReadOutcome>>,
    commands: mpsc::UnboundedReceiver<PollerCommand>,
    current_tx: watch::Sender<Option<CurrentNotification>>,
    notifications_tx: watch::Sender<Vec<NotificationRecord>>,
    state_tx: watch::Sender<PollerState>,
}

impl NotificationPoller {
    /// Spawns the poller task in the [`PollerState::Idle`] state.
    pub fn spawn(
        config: PollerConfig,
        source: Arc<dyn NotificationSource>,
        store: Arc<dyn WatermarkStore>,
    ) -> (PollerHandle, JoinHandle<()>) {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (current_tx, current) = watch::channel(None);
        let (notifications_tx, notifications) = watch::channel(Vec::new());
        let (state_tx, state) = watch::channel(PollerState::Idle);

        let poller = Self {
            config,
            source,
            dedup: DedupEngine::new(store),
            state: PollerState::Idle,
            ticker: None,
            in_flight: None,
            pending_reads: FuturesUnordered::new(),
            commands,
            current_tx,
            notifications_tx,
            state_tx,
        };
        let handle = PollerHandle {
            commands: commands_tx,
            current,
            notifications,
            state,
        };
        (handle, spawn_task(poller.run()))
    }

    async fn run(mut self) {
        info!("[NotificationPoller] Started (interval {:?}, fetch timeout {:?}).", self.config.interval, self.config.fetch_timeout);
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(PollerCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                _ = next_tick(&mut self.ticker) => self.start_fetch(),
                (actor, result) = next_outcome(&mut self.in_flight) => self.finish_fetch(actor, result).await,
                Some(outcome) = self.pending_reads.next(), if !self.pending_reads.is_empty() => self.finish_mark_read(outcome),
            }
        }
        self.in_flight = None;
        self.pending_reads.clear();
        self.ticker = None;
        info!("[NotificationPoller] Stopped.");
    }

    fn handle_command(&mut self, command: PollerCommand) {
        match command {
            PollerCommand::SetActor(actor) => self.switch_actor(actor),
            PollerCommand::Dismiss(only) => self.dismiss(only),
            PollerCommand::MarkRead { id, reply } => self.start_mark_read(id, reply),
            PollerCommand::Refresh => self.start_fetch(),
            // Handled by the run loop.
            PollerCommand::Shutdown => {}
        }
    }

    fn switch_actor(&mut self, actor: ActorDescriptor) {
        let next = if actor.is_none() {
            PollerState::Suspended
        } else {
            PollerState::Polling(actor)
        };
        if next == self.state {
            debug!("[NotificationPoller] Actor unchanged ({:?}).", next);
            return;
        }

        // Nothing from the previous actor may survive the switch.
        self.in_flight = None;
        self.dedup.reset();
        self.current_tx.send_replace(None);
        self.notifications_tx.send_replace(Vec::new());

        self.ticker = match next {
            PollerState::Polling(_) => {
                let mut ticker = time::interval(self.config.interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                Some(ticker)
            }
            _ => None,
        };

        info!("[NotificationPoller] {:?} -> {:?}", self.state, next);
        self.state = next.clone();
        self.state_tx.send_replace(next);
    }

    fn start_fetch(&mut self) {
        let PollerState::Polling(actor) = &self.state else {
            debug!("[NotificationPoller] No active actor; nothing to fetch.");
            return;
        };
        if self.in_flight.is_some() {
            debug!("[NotificationPoller] Fetch for {} still in flight; skipping tick.", actor);
            return;
        }
        let Some(actor_id) = actor.id().cloned() else {
            return;
        };

        let actor = actor.clone();
        let source = Arc::clone(&self.source);
        let fetch_timeout = self.config.fetch_timeout;
        self.in_flight = Some(Box::pin(async move {
            let result = match timeout(fetch_timeout, source.list_notifications(&actor_id, actor.kind())).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(fetch_timeout)),
            };
            (actor, result)
        }));
    }

    async fn finish_fetch(&mut self, actor: ActorDescriptor, result: Result<Vec<NotificationRecord>, FetchError>) {
        self.in_flight = None;
        if !matches!(&self.state, PollerState::Polling(active) if *active == actor) {
            debug!("[NotificationPoller] Discarding result for inactive actor {}.", actor);
            return;
        }

        let records = match result {
            Ok(records) => records,
            Err(e) => {
                warn!("[NotificationPoller] Fetch for {} failed, skipping tick: {}", actor, e);
                return;
            }
        };
        self.notifications_tx.send_replace(records.clone());

        let Some(key) = WatermarkKey::for_actor(&actor) else {
            return;
        };
        if let Some(Decision { admitted: Some(record), .. }) = self.dedup.evaluate(&key, &records).await {
            info!("[NotificationPoller] Admitted notification {} for {}.", record.id, actor);
            self.current_tx.send_replace(Some(CurrentNotification {
                record,
                actor_kind: actor.kind(),
            }));
        }
    }

    fn dismiss(&mut self, only: Option<NotificationId>) {
        let cleared = self.current_tx.send_if_modified(|current| {
            let matches = match (current.as_ref(), only) {
                (Some(_), None) => true,
                (Some(shown), Some(id)) => shown.id() == id,
                (None, _) => false,
            };
            if matches {
                *current = None;
            }
            matches
        });
        if !cleared {
            debug!("[NotificationPoller] Dismiss({:?}) did not match the current notification.", only);
        }
    }

    fn start_mark_read(&mut self, id: NotificationId, reply: oneshot::Sender<Result<(), FetchError>>) {
        let PollerState::Polling(actor) = &self.state else {
            let _ = reply.send(Err(FetchError::NoActiveActor));
            return;
        };

        let actor = actor.clone();
        let source = Arc::clone(&self.source);
        let fetch_timeout = self.config.fetch_timeout;
        self.pending_reads.push(Box::pin(async move {
            let result = match timeout(fetch_timeout, source.mark_read(id)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(fetch_timeout)),
            };
            MarkReadOutcome { actor, id, reply, result }
        }));
    }

    fn finish_mark_read(&mut self, outcome: MarkReadOutcome) {
        let MarkReadOutcome { actor, id, reply, result } = outcome;
        match &result {
            Err(e) => warn!("[NotificationPoller] Marking notification {} as read failed: {}", id, e),
            // The cached list belongs to whoever is active now.
            Ok(()) if matches!(&self.state, PollerState::Polling(active) if *active == actor) => {
                self.notifications_tx.send_modify(|records| {
                    records.iter_mut().filter(|r| r.id == id).for_each(|r| r.is_read = true);
                });
            }
            Ok(()) => debug!("[NotificationPoller] {} was marked read after {} went inactive.", id, actor),
        }
        let _ = reply.send(result);
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker.as_mut() {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn next_outcome(in_flight: &mut Option<BoxFuture<'static, FetchOutcome>>) -> FetchOutcome {
    match in_flight.as_mut() {
        Some(fetch) => fetch.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ActorId, ActorKind};
    use crate::notifications::persistence::InMemoryWatermarkStore;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const INTERVAL: Duration = Duration::from_secs(10);

    fn unread(id: NotificationId) -> NotificationRecord {
        NotificationRecord::new(id, format!("n{}", id), "body", false)
    }

    /// Plays back scripted responses, then keeps answering with the last list.
    #[derive(Default)]
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<Vec<NotificationRecord>, FetchError>>>,
        fallback: Mutex<Vec<NotificationRecord>>,
        delay: Mutex<Duration>,
        mark_delay: Mutex<Duration>,
        calls: AtomicUsize,
        requested: Mutex<Vec<(ActorKind, ActorId)>>,
        marked: Mutex<Vec<NotificationId>>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Vec<NotificationRecord>, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                ..Default::default()
            })
        }

        fn lists(lists: Vec<Vec<NotificationRecord>>) -> Arc<Self> {
            Self::new(lists.into_iter().map(Ok).collect())
        }

        fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = delay;
        }

        fn set_mark_delay(&self, delay: Duration) {
            *self.mark_delay.lock().unwrap() = delay;
        }

        fn push(&self, response: Result<Vec<NotificationRecord>, FetchError>) {
            self.script.lock().unwrap().push_back(response);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NotificationSource for ScriptedSource {
        async fn list_notifications(
            &self,
            actor_id: &ActorId,
            actor_kind: ActorKind,
        ) -> Result<Vec<NotificationRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push((actor_kind, actor_id.clone()));
            let delay = *self.delay.lock().unwrap();
            if !delay.is_zero() {
                time::sleep(delay).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(list)) => {
                    *self.fallback.lock().unwrap() = list.clone();
                    Ok(list)
                }
                Some(Err(e)) => Err(e),
                None => Ok(self.fallback.lock().unwrap().clone()),
            }
        }

        async fn mark_read(&self, id: NotificationId) -> Result<(), FetchError> {
            let delay = *self.mark_delay.lock().unwrap();
            if !delay.is_zero() {
                time::sleep(delay).await;
            }
            self.marked.lock().unwrap().push(id);
            Ok(())
        }
    }

    fn spawn_poller(source: Arc<ScriptedSource>, store: InMemoryWatermarkStore) -> (PollerHandle, JoinHandle<()>) {
        let config = PollerConfig {
            interval: INTERVAL,
            fetch_timeout: Duration::from_secs(60),
        };
        NotificationPoller::spawn(config, source, Arc::new(store))
    }

    async fn settle() {
        time::sleep(Duration::from_millis(1)).await;
    }

    fn user7_key() -> WatermarkKey {
        WatermarkKey::for_actor(&ActorDescriptor::user("7")).unwrap()
    }

    fn current_id(handle: &PollerHandle) -> Option<NotificationId> {
        handle.current_notification().map(|c| c.id())
    }

    async fn stop(handle: PollerHandle, task: JoinHandle<()>) {
        handle.shutdown().unwrap();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn starts_idle_without_fetching() {
        let source = ScriptedSource::lists(vec![vec![unread(1)]]);
        let (handle, task) = spawn_poller(source.clone(), InMemoryWatermarkStore::new());

        time::sleep(INTERVAL * 3).await;

        assert_eq!(handle.state(), PollerState::Idle);
        assert_eq!(source.calls(), 0);
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn first_poll_records_watermark_without_admitting() {
        let store = InMemoryWatermarkStore::new();
        let source = ScriptedSource::lists(vec![vec![unread(5), unread(4)]]);
        let (handle, task) = spawn_poller(source.clone(), store.clone());

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;

        assert_eq!(handle.state(), PollerState::Polling(ActorDescriptor::user("7")));
        assert_eq!(handle.notifications().len(), 2);
        assert_eq!(handle.current_notification(), None);
        assert_eq!(store.snapshot().get(&user7_key().to_string()), Some(&5));
        assert_eq!(
            source.requested.lock().unwrap().clone(),
            vec![(ActorKind::User, ActorId::new("7"))]
        );
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn advancement_admits_once_per_new_record() {
        let store = InMemoryWatermarkStore::new().with_entry(&user7_key(), 5);
        let source = ScriptedSource::lists(vec![vec![unread(5)], vec![unread(9), unread(5)]]);
        let (handle, task) = spawn_poller(source.clone(), store.clone());

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;
        assert_eq!(handle.current_notification(), None);

        time::sleep(INTERVAL).await;
        let current = handle.current_notification().unwrap();
        assert_eq!(current.id(), 9);
        assert_eq!(current.actor_kind, ActorKind::User);
        assert_eq!(store.snapshot().get(&user7_key().to_string()), Some(&9));

        handle.dismiss().unwrap();
        time::sleep(INTERVAL).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(handle.current_notification(), None);
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn read_newest_record_advances_without_admission() {
        let store = InMemoryWatermarkStore::new().with_entry(&user7_key(), 5);
        let mut read_nine = unread(9);
        read_nine.is_read = true;
        let source = ScriptedSource::lists(vec![vec![unread(5)], vec![read_nine]]);
        let (handle, task) = spawn_poller(source, store.clone());

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        time::sleep(INTERVAL + Duration::from_millis(1)).await;

        assert_eq!(handle.current_notification(), None);
        assert_eq!(store.snapshot().get(&user7_key().to_string()), Some(&9));
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn newer_admission_replaces_the_current_one() {
        let store = InMemoryWatermarkStore::new().with_entry(&user7_key(), 5);
        let source = ScriptedSource::lists(vec![vec![unread(5)], vec![unread(9)], vec![unread(10), unread(9)]]);
        let (handle, task) = spawn_poller(source, store);

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        time::sleep(INTERVAL + Duration::from_millis(1)).await;
        assert_eq!(current_id(&handle), Some(9));

        time::sleep(INTERVAL).await;
        assert_eq!(current_id(&handle), Some(10));
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn actor_switch_resets_state_and_restores_previous_watermark() {
        let store = InMemoryWatermarkStore::new().with_entry(&user7_key(), 5);
        let source = ScriptedSource::lists(vec![vec![unread(5)], vec![unread(6)]]);
        let (handle, task) = spawn_poller(source.clone(), store.clone());

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        time::sleep(INTERVAL + Duration::from_millis(1)).await;
        assert_eq!(current_id(&handle), Some(6));

        source.set_delay(Duration::from_secs(2));
        handle.set_actor(ActorDescriptor::host("3")).unwrap();
        settle().await;
        // The host fetch is still in flight: nothing from user 7 is left.
        assert_eq!(handle.current_notification(), None);
        assert!(handle.notifications().is_empty());
        assert_eq!(handle.state(), PollerState::Polling(ActorDescriptor::host("3")));

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(handle.notifications().iter().map(|r| r.id).collect::<Vec<_>>(), vec![6]);
        assert_eq!(handle.current_notification(), None);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.get("lastSeenNotificationId_user_7"), Some(&6));
        assert_eq!(snapshot.get("lastSeenNotificationId_host_3"), Some(&6));

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(handle.current_notification(), None);
        assert_eq!(store.snapshot().get("lastSeenNotificationId_user_7"), Some(&6));
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn setting_the_same_actor_is_a_no_op() {
        let source = ScriptedSource::lists(vec![vec![unread(1)]]);
        let (handle, task) = spawn_poller(source.clone(), InMemoryWatermarkStore::new());

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;
        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;

        assert_eq!(source.calls(), 1);
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_actor_suspends_polling() {
        let source = ScriptedSource::lists(vec![vec![unread(1)]]);
        let (handle, task) = spawn_poller(source.clone(), InMemoryWatermarkStore::new());

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;
        handle.set_actor(ActorDescriptor::none()).unwrap();
        time::sleep(INTERVAL * 3).await;

        assert_eq!(handle.state(), PollerState::Suspended);
        assert_eq!(source.calls(), 1);
        assert!(handle.notifications().is_empty());
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_ticks_do_not_start_a_second_fetch() {
        let source = ScriptedSource::lists(vec![vec![unread(1)]]);
        source.set_delay(Duration::from_secs(25));
        let (handle, task) = spawn_poller(source.clone(), InMemoryWatermarkStore::new());

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        time::sleep(Duration::from_secs(29)).await;
        assert_eq!(source.calls(), 1);
        assert_eq!(handle.notifications().len(), 1);

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(source.calls(), 2);
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out_without_state_change() {
        let store = InMemoryWatermarkStore::new();
        let source = ScriptedSource::lists(vec![vec![unread(1)]]);
        source.set_delay(Duration::from_secs(20));
        let config = PollerConfig {
            interval: INTERVAL,
            fetch_timeout: Duration::from_secs(5),
        };
        let (handle, task) = NotificationPoller::spawn(config, source.clone(), Arc::new(store.clone()));

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        time::sleep(Duration::from_secs(6)).await;
        assert!(handle.notifications().is_empty());
        assert!(store.snapshot().is_empty());

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(handle.state(), PollerState::Polling(ActorDescriptor::user("7")));
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_skips_the_tick() {
        let store = InMemoryWatermarkStore::new();
        let source = ScriptedSource::new(vec![
            Err(FetchError::Status {
                url: "http://backend/notifications/user/7".to_string(),
                status: 500,
            }),
            Ok(vec![unread(5)]),
        ]);
        let (handle, task) = spawn_poller(source, store.clone());

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;
        assert!(handle.notifications().is_empty());
        assert!(store.snapshot().is_empty());

        time::sleep(INTERVAL).await;
        assert_eq!(store.snapshot().get(&user7_key().to_string()), Some(&5));
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_fetches_immediately() {
        let store = InMemoryWatermarkStore::new().with_entry(&user7_key(), 5);
        let source = ScriptedSource::lists(vec![vec![unread(5)]]);
        let (handle, task) = spawn_poller(source.clone(), store);

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;
        source.push(Ok(vec![unread(8)]));
        handle.refresh().unwrap();
        settle().await;

        assert_eq!(source.calls(), 2);
        assert_eq!(current_id(&handle), Some(8));
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn dismiss_if_only_clears_the_matching_notification() {
        let store = InMemoryWatermarkStore::new().with_entry(&user7_key(), 5);
        let source = ScriptedSource::lists(vec![vec![unread(9)]]);
        let (handle, task) = spawn_poller(source, store);

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;
        assert_eq!(current_id(&handle), Some(9));

        handle.dismiss_if(8).unwrap();
        settle().await;
        assert_eq!(current_id(&handle), Some(9));

        handle.dismiss_if(9).unwrap();
        settle().await;
        assert_eq!(handle.current_notification(), None);
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn mark_read_updates_backlog_but_not_watermark() {
        let store = InMemoryWatermarkStore::new();
        let source = ScriptedSource::lists(vec![vec![unread(5), unread(3)]]);
        let (handle, task) = spawn_poller(source.clone(), store.clone());

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;
        handle.mark_read(3).await.unwrap();

        let backlog = handle.notifications();
        assert!(!backlog[0].is_read);
        assert!(backlog[1].is_read);
        assert_eq!(source.marked.lock().unwrap().clone(), vec![3]);
        assert_eq!(store.snapshot().get(&user7_key().to_string()), Some(&5));
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn slow_mark_read_does_not_stall_ticks_or_actor_switches() {
        let store = InMemoryWatermarkStore::new().with_entry(&user7_key(), 5);
        let source = ScriptedSource::lists(vec![vec![unread(5)], vec![unread(9), unread(5)]]);
        source.set_mark_delay(Duration::from_secs(30));
        let (handle, task) = spawn_poller(source.clone(), store);

        handle.set_actor(ActorDescriptor::user("7")).unwrap();
        settle().await;
        let pending = tokio::spawn({
            let handle = handle.clone();
            async move { handle.mark_read(5).await }
        });

        time::sleep(INTERVAL).await;
        assert!(!pending.is_finished());
        assert_eq!(source.calls(), 2);
        assert_eq!(current_id(&handle), Some(9));

        handle.set_actor(ActorDescriptor::host("3")).unwrap();
        settle().await;
        assert!(!pending.is_finished());
        assert_eq!(handle.state(), PollerState::Polling(ActorDescriptor::host("3")));
        assert!(source.marked.lock().unwrap().is_empty());

        time::sleep(Duration::from_secs(30)).await;
        pending.await.unwrap().unwrap();
        assert_eq!(source.marked.lock().unwrap().clone(), vec![5]);
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn mark_read_without_actor_is_rejected() {
        let source = ScriptedSource::lists(vec![]);
        let (handle, task) = spawn_poller(source.clone(), InMemoryWatermarkStore::new());

        let result = handle.mark_read(3).await;

        assert!(matches!(result, Err(PollerError::Fetch(FetchError::NoActiveActor))));
        assert!(source.marked.lock().unwrap().is_empty());
        stop(handle, task).await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_every_handle_stops_the_task() {
        let (handle, task) = spawn_poller(ScriptedSource::lists(vec![]), InMemoryWatermarkStore::new());
        let state = handle.subscribe_state();
        drop(handle);

        task.await.unwrap();
        assert_eq!(*state.borrow(), PollerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_after_shutdown_report_stopped() {
        let (handle, task) = spawn_poller(ScriptedSource::lists(vec![]), InMemoryWatermarkStore::new());
        handle.shutdown().unwrap();
        task.await.unwrap();

        assert!(matches!(handle.refresh(), Err(PollerError::Stopped)));
        assert!(matches!(handle.mark_read(1).await, Err(PollerError::Stopped)));
    }
}
