use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for MongoDB backend operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB options backend.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to load options")]
    LoadOptions {
        #[source]
        source: MongoError,
    },
    #[error("failed to insert options")]
    InsertOptions {
        #[source]
        source: MongoError,
    },
    #[error("failed to update options ({operation})")]
    UpdateOptions {
        operation: &'static str,
        #[source]
        source: MongoError,
    },
}
