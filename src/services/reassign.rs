//! Seam to the project store: redistributing projects after a group layout change.

use futures::future::BoxFuture;
use thiserror::Error;
use tracing::debug;

use crate::dao::{models::Options, storage::StorageError};

/// Failure reported by a [`GroupReassigner`].
#[derive(Debug, Error)]
pub enum ReassignError {
    /// Nothing was reassigned; the caller may carry on with the layout change.
    #[error("group reassignment skipped: {0}")]
    Skipped(String),
    /// Reassignment failed; the layout change must not be committed.
    #[error("group reassignment failed")]
    Failed(#[source] StorageError),
}

/// Assigns every project a group number matching an options snapshot.
pub trait GroupReassigner: Send + Sync {
    /// Redistribute projects using `options.group_sizes` and `options.num_groups`.
    fn reassign_all_group_nums(
        &self,
        options: Options,
    ) -> BoxFuture<'static, Result<(), ReassignError>>;
}

/// Reassigner used when no project collection is attached to this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReassigner;

impl GroupReassigner for NoopReassigner {
    fn reassign_all_group_nums(
        &self,
        options: Options,
    ) -> BoxFuture<'static, Result<(), ReassignError>> {
        debug!(
            num_groups = options.num_groups,
            group_sizes = ?options.group_sizes,
            "no project store attached; skipping group reassignment"
        );
        Box::pin(async { Ok(()) })
    }
}
