use std::sync::Arc;

use futures::future::BoxFuture;
use mongodb::{
    Collection, Database,
    bson::{Document, doc},
};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        increment_manual_switches_update, set_clock_update, set_fields_update,
        set_group_layout_update, singleton_filter,
    },
};
use crate::{
    dao::{
        models::{Options, OptionsPatch},
        options_store::OptionsStore,
        storage::StorageResult,
    },
    state::clock::ClockState,
};

const OPTIONS_COLLECTION_NAME: &str = "options";

/// MongoDB-backed [`OptionsStore`] working on the single `options` document.
#[derive(Clone)]
pub struct MongoOptionsStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    // The database handle keeps its client (and connection pool) alive.
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let database =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.database = database;
        Ok(())
    }
}

impl MongoOptionsStore {
    /// Establish a connection to MongoDB.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { database }),
            config,
        });

        Ok(Self { inner })
    }

    async fn collection(&self) -> Collection<Options> {
        let guard = self.inner.state.read().await;
        guard.database.collection::<Options>(OPTIONS_COLLECTION_NAME)
    }

    async fn find_options(&self) -> MongoResult<Option<Options>> {
        self.collection()
            .await
            .find_one(singleton_filter())
            .await
            .map_err(|source| MongoDaoError::LoadOptions { source })
    }

    async fn insert_options(&self, options: Options) -> MongoResult<()> {
        self.collection()
            .await
            .insert_one(&options)
            .await
            .map_err(|source| MongoDaoError::InsertOptions { source })?;
        Ok(())
    }

    async fn update(&self, operation: &'static str, update: Document) -> MongoResult<()> {
        let result = self
            .collection()
            .await
            .update_one(singleton_filter(), update)
            .await
            .map_err(|source| MongoDaoError::UpdateOptions { operation, source })?;

        if result.matched_count == 0 {
            debug!(operation, "no options document matched the update");
        }
        Ok(())
    }

    async fn set_fields(&self, patch: OptionsPatch) -> MongoResult<()> {
        // An empty `$set` is rejected by servers older than 5.0.
        if patch.is_empty() {
            return Ok(());
        }
        self.update("set_fields", set_fields_update(patch)).await
    }
}

impl OptionsStore for MongoOptionsStore {
    fn find_options(&self) -> BoxFuture<'static, StorageResult<Option<Options>>> {
        let store = self.clone();
        Box::pin(async move { store.find_options().await.map_err(Into::into) })
    }

    fn insert_options(&self, options: Options) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_options(options).await.map_err(Into::into) })
    }

    fn set_fields(&self, patch: OptionsPatch) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.set_fields(patch).await.map_err(Into::into) })
    }

    fn set_clock(&self, clock: ClockState) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update("set_clock", set_clock_update(&clock))
                .await
                .map_err(Into::into)
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
                .update(
                    "set_group_layout",
                    set_group_layout_update(num_groups, group_sizes),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn increment_manual_switches(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update(
                    "increment_manual_switches",
                    increment_manual_switches_update(),
                )
                .await
                .map_err(Into::into)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
