//! Process-local options backend used when no database is configured and in tests.

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use tracing::debug;

use super::OptionsStore;
use crate::{
    dao::{
        models::{Options, OptionsPatch},
        storage::StorageResult,
    },
    state::clock::ClockState,
};

/// [`OptionsStore`] keeping the record behind an async lock.
///
/// Every call holds the lock for its whole effect, which gives the same
/// per-call atomicity as a document database. Updates against an empty store
/// match nothing and succeed without creating a record.
#[derive(Clone, Default)]
pub struct MemoryOptionsStore {
    record: Arc<RwLock<Option<Options>>>,
}

impl MemoryOptionsStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store already holding `options`.
    pub fn with_options(options: Options) -> Self {
        Self {
            record: Arc::new(RwLock::new(Some(options))),
        }
    }

    /// Copy of the stored record.
    pub async fn snapshot(&self) -> Option<Options> {
        self.record.read().await.clone()
    }

    async fn modify(&self, operation: &'static str, change: impl FnOnce(&mut Options)) {
        let mut guard = self.record.write().await;
        match guard.as_mut() {
            Some(options) => change(options),
            None => debug!(operation, "no options record to update"),
        }
    }
}

impl OptionsStore for MemoryOptionsStore {
    fn find_options(&self) -> BoxFuture<'static, StorageResult<Option<Options>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.snapshot().await) })
    }

    fn insert_options(&self, options: Options) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut guard = store.record.write().await;
            if guard.is_some() {
                // Lookups return the first record, so a later insert is never visible.
                debug!("options record already present; keeping the existing one");
            } else {
                *guard = Some(options);
            }
            Ok(())
        })
    }

    fn set_fields(&self, patch: OptionsPatch) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .modify("set_fields", |options| patch.apply_to(options))
                .await;
            Ok(())
        })
    }

    fn set_clock(&self, clock: ClockState) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .modify("set_clock", |options| options.clock = clock)
                .await;
            Ok(())
        })
    }

    fn set_group_layout(
        &self,
        num_groups: i64,
        group_sizes: Vec<i64>,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .modify("set_group_layout", |options| {
                    options.num_groups = num_groups;
                    options.group_sizes = group_sizes;
                })
                .await;
            Ok(())
        })
    }

    fn increment_manual_switches(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .modify("increment_manual_switches", |options| {
                    options.manual_switches += 1;
                })
                .await;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
