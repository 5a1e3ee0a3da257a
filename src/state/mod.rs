/// Room-keyed publish/subscribe hub.
pub mod fanout;
/// Score resolution state machine.
pub mod lifecycle;
/// Activity timer registry.
pub mod timers;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{RwLock, watch};
use tokio::time::timeout;

use crate::{
    config::AppConfig,
    dao::{directory::Directory, score_store::ScoreStore, storage::StorageResult},
    error::ServiceError,
};

pub use self::fanout::{FanoutHub, Room, RoomSubscription};
pub use self::timers::TimerRegistry;

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Central application state storing the storage handle, the notification hub,
/// and the timer registry.
pub struct AppState {
    score_store: RwLock<Option<Arc<dyn ScoreStore>>>,
    directory: Arc<dyn Directory>,
    fanout: FanoutHub,
    timers: TimerRegistry,
    degraded: watch::Sender<bool>,
    store_timeout: Option<Duration>,
    sse_keepalive: Duration,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a score store is installed.
    pub fn new(config: &AppConfig, directory: Arc<dyn Directory>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            score_store: RwLock::new(None),
            directory,
            fanout: FanoutHub::new(config.fanout_room_capacity),
            timers: TimerRegistry::new(),
            degraded: degraded_tx,
            store_timeout: Some(config.store_timeout),
            sse_keepalive: config.sse_keepalive,
        })
    }

    /// Obtain a handle to the current score store, if one is installed.
    pub async fn score_store(&self) -> Option<Arc<dyn ScoreStore>> {
        let guard = self.score_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the score store or fail with the degraded-mode error.
    pub async fn require_score_store(&self) -> Result<Arc<dyn ScoreStore>, ServiceError> {
        self.score_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new score store implementation and leave degraded mode.
    pub async fn install_score_store(&self, store: Arc<dyn ScoreStore>) {
        {
            let mut guard = self.score_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current score store and enter degraded mode.
    pub async fn clear_score_store(&self) {
        {
            let mut guard = self.score_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.score_store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Directory collaborator used for existence checks during validation.
    pub fn directory(&self) -> Arc<dyn Directory> {
        Arc::clone(&self.directory)
    }

    /// Hub fanning events out to per-user and per-team rooms.
    pub fn fanout(&self) -> &FanoutHub {
        &self.fanout
    }

    /// Registry of activity timers.
    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    /// Keep-alive interval applied to SSE responses.
    pub fn sse_keepalive(&self) -> Duration {
        self.sse_keepalive
    }

    /// Run a storage operation under the configured latency budget so a
    /// stalled backend surfaces as [`ServiceError::Timeout`] instead of a hang.
    pub async fn store_op<T>(
        &self,
        operation: impl Future<Output = StorageResult<T>>,
    ) -> Result<T, ServiceError> {
        match self.store_timeout {
            Some(limit) => match timeout(limit, operation).await {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err(ServiceError::Timeout),
            },
            None => operation.await.map_err(Into::into),
        }
    }

    /// Update and broadcast the degraded flag when the value changes.
    fn update_degraded(&self, value: bool) {
        if *self.degraded.borrow() == value {
            return;
        }

        let _ = self.degraded.send(value);
    }
}
