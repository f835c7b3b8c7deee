//! Operations on the singleton options record.
//!
//! Every function talks to the backend through [`OptionsStore`] and relies on
//! the backend's per-call atomicity only. Sequences such as read-then-write in
//! [`update_clock_conditional`] or [`update_num_groups`] are not transactional
//! and can interleave with concurrent callers.

use tracing::{debug, info, warn};
use validator::Validate;

use crate::{
    dao::{
        models::{DEFAULT_GROUP_SIZE, Options, OptionsPatch},
        options_store::OptionsStore,
    },
    dto::options::OptionalOptions,
    error::ServiceError,
    services::reassign::{GroupReassigner, ReassignError},
    state::clock::ClockState,
};

/// Largest group count accepted by [`update_num_groups`].
pub const MAX_GROUPS: i64 = 1_000;

/// Return the options record, storing the defaults first when none exists.
pub async fn get_options(store: &dyn OptionsStore) -> Result<Options, ServiceError> {
    if let Some(options) = store.find_options().await? {
        return Ok(options);
    }

    let options = Options::default();
    store.insert_options(options.clone()).await?;
    info!("no options record found; stored defaults");
    Ok(options)
}

/// Overwrite the fields present in `request`, leaving the others untouched.
pub async fn update_options(
    store: &dyn OptionsStore,
    request: OptionalOptions,
) -> Result<(), ServiceError> {
    request.validate()?;
    let patch = OptionsPatch::from(request);
    debug!(fields = ?patch.fields().collect::<Vec<_>>(), "updating options");
    store.set_fields(patch).await?;
    Ok(())
}

/// Persist `clock` only when clock sync is enabled.
///
/// Returns whether the clock was written.
pub async fn update_clock_conditional(
    store: &dyn OptionsStore,
    clock: ClockState,
) -> Result<bool, ServiceError> {
    let options = get_options(store).await?;
    if !options.clock_sync {
        return Ok(false);
    }

    store.set_clock(clock).await?;
    Ok(true)
}

/// Persist `clock` regardless of the sync flag.
pub async fn update_clock(store: &dyn OptionsStore, clock: ClockState) -> Result<(), ServiceError> {
    store.set_clock(clock).await?;
    Ok(())
}

/// Change the number of groups, resize `group_sizes`, and redistribute projects.
///
/// The reassigner sees the resized sizes together with the previous group
/// count, before anything is written. A skipped reassignment is logged and the
/// change goes ahead; a failed one aborts it.
pub async fn update_num_groups(
    store: &dyn OptionsStore,
    reassigner: &dyn GroupReassigner,
    num_groups: i64,
) -> Result<(), ServiceError> {
    if !(1..=MAX_GROUPS).contains(&num_groups) {
        return Err(ServiceError::InvalidInput(format!(
            "number of groups must be between 1 and {MAX_GROUPS} (got {num_groups})"
        )));
    }

    let mut options = get_options(store).await?;
    let previous = options.num_groups;
    resize_group_sizes(&mut options.group_sizes, previous, num_groups);

    let group_sizes = options.group_sizes.clone();
    match reassigner.reassign_all_group_nums(options).await {
        Ok(()) => {}
        Err(ReassignError::Skipped(reason)) => {
            warn!(%reason, num_groups, "group reassignment skipped");
        }
        Err(err) => return Err(err.into()),
    }

    store.set_group_layout(num_groups, group_sizes).await?;
    info!(previous, num_groups, "updated number of groups");
    Ok(())
}

/// Count one more manual switch.
pub async fn increment_manual_switches(store: &dyn OptionsStore) -> Result<(), ServiceError> {
    store.increment_manual_switches().await?;
    Ok(())
}

/// Shrinking keeps the first `target - 1` sizes. Growing appends one default
/// size per index in `current..target - 1`.
fn resize_group_sizes(group_sizes: &mut Vec<i64>, current: i64, target: i64) {
    if target < current {
        let keep = usize::try_from(target - 1).unwrap_or(0);
        group_sizes.truncate(keep);
    } else if target > current {
        for _ in current..target - 1 {
            group_sizes.push(DEFAULT_GROUP_SIZE);
        }
    }
}
