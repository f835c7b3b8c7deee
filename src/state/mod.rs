pub mod clock;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};

use crate::{
    config::AppConfig, dao::options_store::OptionsStore, error::ServiceError,
    services::reassign::GroupReassigner,
};

use self::clock::ClockState;

/// Handle to the application state shared by every task.
pub type SharedState = Arc<AppState>;

/// Central application state: the options backend, the authoritative clock,
/// and the collaborators the services need.
pub struct AppState {
    options_store: RwLock<Option<Arc<dyn OptionsStore>>>,
    clock: Mutex<ClockState>,
    reassigner: Arc<dyn GroupReassigner>,
    degraded: watch::Sender<bool>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, reassigner: Arc<dyn GroupReassigner>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            options_store: RwLock::new(None),
            clock: Mutex::new(ClockState::new()),
            reassigner,
            degraded: degraded_tx,
            config,
        })
    }

    /// Obtain a handle to the current options store, if one is installed.
    pub async fn options_store(&self) -> Option<Arc<dyn OptionsStore>> {
        let guard = self.options_store.read().await;
        guard.as_ref().cloned()
    }

    /// Options store, or [`ServiceError::Degraded`] while in degraded mode.
    ///
    /// A store attached but not yet confirmed still counts as degraded.
    pub async fn require_options_store(&self) -> Result<Arc<dyn OptionsStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.options_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new options store implementation and leave degraded mode.
    pub async fn install_options_store(&self, store: Arc<dyn OptionsStore>) {
        self.attach_options_store(store).await;
        self.update_degraded(false);
    }

    /// Install a store while staying in degraded mode, so it can be prepared
    /// before callers see it.
    pub async fn attach_options_store(&self, store: Arc<dyn OptionsStore>) {
        let mut guard = self.options_store.write().await;
        *guard = Some(store);
    }

    /// Remove the current options store and enter degraded mode.
    pub async fn clear_options_store(&self) {
        {
            let mut guard = self.options_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update the degraded flag, notifying watchers only when it changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Authoritative in-process judging clock.
    pub fn clock(&self) -> &Mutex<ClockState> {
        &self.clock
    }

    /// Collaborator redistributing projects across groups.
    pub fn reassigner(&self) -> &dyn GroupReassigner {
        self.reassigner.as_ref()
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
