/// Options record model and partial-update types.
pub mod models;
/// Persistence backends for the options record.
pub mod options_store;
/// Storage abstraction layer for database operations.
pub mod storage;
