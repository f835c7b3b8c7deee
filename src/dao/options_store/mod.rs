/// In-process backend.
pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::{env, sync::Arc};

use futures::future::BoxFuture;
use tracing::{info, warn};

use crate::dao::{
    models::{Options, OptionsPatch},
    storage::StorageResult,
};
use crate::state::clock::ClockState;

pub use memory::MemoryOptionsStore;

/// Persistence contract for the singleton options record.
///
/// The record has no key: every method targets the one stored instance. Each
/// call is atomic on its own, sequences of calls are not.
pub trait OptionsStore: Send + Sync {
    /// Fetch the record, `None` when nothing has been stored yet.
    fn find_options(&self) -> BoxFuture<'static, StorageResult<Option<Options>>>;
    /// Store a complete record.
    fn insert_options(&self, options: Options) -> BoxFuture<'static, StorageResult<()>>;
    /// Overwrite exactly the fields carried by `patch`.
    fn set_fields(&self, patch: OptionsPatch) -> BoxFuture<'static, StorageResult<()>>;
    /// Overwrite the embedded clock.
    fn set_clock(&self, clock: ClockState) -> BoxFuture<'static, StorageResult<()>>;
    /// Overwrite `num_groups` and `group_sizes` together.
    fn set_group_layout(
        &self,
        num_groups: i64,
        group_sizes: Vec<i64>,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Add one to `manual_switches` without reading it first.
    fn increment_manual_switches(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Check that the backend still answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Rebuild the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Backend chosen at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// MongoDB collection reached through `uri`.
    #[cfg(feature = "mongo-store")]
    Mongo {
        /// Connection string.
        uri: String,
        /// Database name, defaults to `jury` when absent.
        database: Option<String>,
    },
    /// Process-local record, lost on restart.
    Memory,
}

impl StoreBackend {
    /// Pick the backend from `MONGO_URI` / `MONGO_DB`, falling back to memory.
    pub fn from_env() -> Self {
        let uri = env::var("MONGO_URI").ok().filter(|uri| !uri.trim().is_empty());
        let database = env::var("MONGO_DB").ok().filter(|db| !db.trim().is_empty());
        Self::select(uri, database)
    }

    fn select(uri: Option<String>, database: Option<String>) -> Self {
        match uri {
            #[cfg(feature = "mongo-store")]
            Some(uri) => StoreBackend::Mongo { uri, database },
            #[cfg(not(feature = "mongo-store"))]
            Some(_) => {
                let _ = database;
                warn!("MONGO_URI is set but the mongo-store feature is disabled; using memory store");
                StoreBackend::Memory
            }
            None => {
                let _ = database;
                info!("MONGO_URI not set; options are kept in memory only");
                StoreBackend::Memory
            }
        }
    }

    /// Open a store for this backend.
    pub async fn connect(&self) -> StorageResult<Arc<dyn OptionsStore>> {
        match self {
            #[cfg(feature = "mongo-store")]
            StoreBackend::Mongo { uri, database } => {
                let config = self::mongodb::MongoConfig::from_uri(uri, database.as_deref()).await?;
                let store = self::mongodb::MongoOptionsStore::connect(config).await?;
                Ok(Arc::new(store))
            }
            StoreBackend::Memory => {
                warn!("using in-memory options store; changes will not survive a restart");
                Ok(Arc::new(MemoryOptionsStore::new()))
            }
        }
    }
}
