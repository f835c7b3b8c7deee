//! Judging clock operations on the authoritative in-process clock.
//!
//! Pause, resume and reset change the in-memory clock and then propagate it
//! with [`options_service::update_clock_conditional`], so storage only follows
//! when clock sync is enabled. [`backup`] always writes. A change whose write
//! fails is undone in memory.

use tracing::{debug, info, warn};

use crate::{
    dao::options_store::OptionsStore,
    error::ServiceError,
    services::options_service,
    state::{SharedState, clock::ClockState},
};

/// Pause the judging clock.
pub async fn pause(state: &SharedState) -> Result<ClockState, ServiceError> {
    mutate(state, "pause", ClockState::pause).await
}

/// Resume the judging clock.
pub async fn resume(state: &SharedState) -> Result<ClockState, ServiceError> {
    mutate(state, "resume", ClockState::resume).await
}

/// Stop the judging clock and clear the accumulated time.
pub async fn reset(state: &SharedState) -> Result<ClockState, ServiceError> {
    mutate(state, "reset", ClockState::reset).await
}

/// Elapsed judging time in milliseconds.
pub async fn duration(state: &SharedState) -> i64 {
    state.clock().lock().await.duration()
}

/// Write the current clock to storage regardless of clock sync.
pub async fn backup(state: &SharedState) -> Result<(), ServiceError> {
    let store = state.require_options_store().await?;
    let guard = state.clock().lock().await;
    options_service::update_clock(store.as_ref(), *guard).await
}

/// Replace the in-memory clock with the one persisted in `store`.
///
/// Takes the store directly so it can run before degraded mode is left.
pub async fn restore(
    state: &SharedState,
    store: &dyn OptionsStore,
) -> Result<ClockState, ServiceError> {
    let mut guard = state.clock().lock().await;
    let options = options_service::get_options(store).await?;
    *guard = options.clock;
    info!(
        running = options.clock.running,
        duration_ms = options.clock.duration(),
        "restored judging clock from storage"
    );
    Ok(options.clock)
}

async fn mutate(
    state: &SharedState,
    operation: &'static str,
    change: fn(&mut ClockState),
) -> Result<ClockState, ServiceError> {
    let store = state.require_options_store().await?;
    // Held across the write so storage sees changes in the order they were made.
    let mut guard = state.clock().lock().await;
    let previous = *guard;
    change(&mut *guard);
    let clock = *guard;

    match options_service::update_clock_conditional(store.as_ref(), clock).await {
        Ok(written) => {
            debug!(operation, written, running = clock.running, "clock updated");
            Ok(clock)
        }
        Err(err) => {
            *guard = previous;
            warn!(operation, error = %err, "clock change could not be propagated; rolled back");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{Options, OptionsPatch},
            options_store::MemoryOptionsStore,
            storage::{StorageError, StorageResult},
        },
        services::reassign::NoopReassigner,
        state::AppState,
    };

    /// Memory store whose first clock writes are slow, or whose clock writes fail.
    #[derive(Clone, Default)]
    struct ScriptedStore {
        inner: MemoryOptionsStore,
        slow_clock_writes: Arc<AtomicUsize>,
        reject_clock_writes: bool,
    }

    impl OptionsStore for ScriptedStore {
        fn find_options(&self) -> BoxFuture<'static, StorageResult<Option<Options>>> {
            self.inner.find_options()
        }

        fn insert_options(&self, options: Options) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.insert_options(options)
        }

        fn set_fields(&self, patch: OptionsPatch) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.set_fields(patch)
        }

        fn set_clock(&self, clock: ClockState) -> BoxFuture<'static, StorageResult<()>> {
            let inner = self.inner.clone();
            let slow = self
                .slow_clock_writes
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            let reject = self.reject_clock_writes;
            Box::pin(async move {
                if slow {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                }
                if reject {
                    return Err(StorageError::unavailable(
                        "write rejected".into(),
                        std::io::Error::other("write rejected"),
                    ));
                }
                inner.set_clock(clock).await
            })
        }

        fn set_group_layout(
            &self,
            num_groups: i64,
            group_sizes: Vec<i64>,
        ) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.set_group_layout(num_groups, group_sizes)
        }

        fn increment_manual_switches(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.increment_manual_switches()
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    fn synced() -> Options {
        Options {
            clock_sync: true,
            ..Options::default()
        }
    }

    async fn state_with(options: Options) -> (SharedState, MemoryOptionsStore) {
        let store = MemoryOptionsStore::with_options(options);
        let state = AppState::new(AppConfig::default(), Arc::new(NoopReassigner));
        state.install_options_store(Arc::new(store.clone())).await;
        (state, store)
    }

    #[tokio::test]
    async fn operations_require_storage() {
        let state = AppState::new(AppConfig::default(), Arc::new(NoopReassigner));
        assert!(matches!(resume(&state).await, Err(ServiceError::Degraded)));
        assert!(matches!(backup(&state).await, Err(ServiceError::Degraded)));
        assert!(!state.clock().lock().await.running);
    }

    #[tokio::test]
    async fn changes_stay_in_memory_without_clock_sync() {
        let (state, store) = state_with(Options::default()).await;

        let clock = resume(&state).await.unwrap();
        assert!(clock.running);
        assert_eq!(store.snapshot().await.unwrap().clock, ClockState::new());
    }

    #[tokio::test]
    async fn changes_are_persisted_with_clock_sync() {
        let (state, store) = state_with(synced()).await;

        let resumed = resume(&state).await.unwrap();
        assert_eq!(store.snapshot().await.unwrap().clock, resumed);

        let paused = pause(&state).await.unwrap();
        assert!(!paused.running);
        assert_eq!(store.snapshot().await.unwrap().clock, paused);

        reset(&state).await.unwrap();
        assert_eq!(store.snapshot().await.unwrap().clock, ClockState::new());
        assert_eq!(duration(&state).await, 0);
    }

    #[tokio::test]
    async fn backup_ignores_clock_sync() {
        let (state, store) = state_with(Options::default()).await;
        resume(&state).await.unwrap();

        backup(&state).await.unwrap();

        let persisted = store.snapshot().await.unwrap().clock;
        assert_eq!(persisted, *state.clock().lock().await);
        assert!(persisted.running);
    }

    #[tokio::test]
    async fn restore_loads_persisted_clock() {
        let persisted = ClockState {
            start_time: 0,
            pause_time: 42_000,
            running: false,
        };
        let (state, store) = state_with(Options {
            clock: persisted,
            ..Options::default()
        })
        .await;

        assert_eq!(restore(&state, &store).await.unwrap(), persisted);
        assert_eq!(duration(&state).await, 42_000);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_changes_reach_storage_in_order() {
        let store = ScriptedStore {
            inner: MemoryOptionsStore::with_options(synced()),
            slow_clock_writes: Arc::new(AtomicUsize::new(1)),
            ..ScriptedStore::default()
        };
        let state = AppState::new(AppConfig::default(), Arc::new(NoopReassigner));
        state.install_options_store(Arc::new(store.clone())).await;

        let resumed = tokio::spawn({
            let state = state.clone();
            async move { resume(&state).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        pause(&state).await.unwrap();
        resumed.await.unwrap().unwrap();

        let authoritative = *state.clock().lock().await;
        assert!(!authoritative.running);
        assert_eq!(store.inner.snapshot().await.unwrap().clock, authoritative);
    }

    #[tokio::test]
    async fn failed_write_rolls_back_in_memory_clock() {
        let store = ScriptedStore {
            inner: MemoryOptionsStore::with_options(synced()),
            reject_clock_writes: true,
            ..ScriptedStore::default()
        };
        let state = AppState::new(AppConfig::default(), Arc::new(NoopReassigner));
        state.install_options_store(Arc::new(store.clone())).await;

        let err = resume(&state).await.unwrap_err();

        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert_eq!(*state.clock().lock().await, ClockState::new());
        assert_eq!(store.inner.snapshot().await.unwrap().clock, ClockState::new());
    }
}
