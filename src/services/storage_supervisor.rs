use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{options_store::OptionsStore, storage::StorageError},
    services::clock_service,
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Keep an options store installed, restoring the judging clock from it once.
///
/// While no healthy store is available the shared state stays in degraded
/// mode. The clock is restored on the first successful connection, before
/// degraded mode is left, so a reconnect never rewinds the in-process clock
/// and no clock change can be overwritten by the restore.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn OptionsStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;
    let mut clock_restored = false;

    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
                continue;
            }
        };

        state.attach_options_store(store.clone()).await;

        if !clock_restored {
            if let Err(err) = clock_service::restore(&state, store.as_ref()).await {
                warn!(error = %err, "failed to restore judging clock; retrying connection");
                state.clear_options_store().await;
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
                continue;
            }
            clock_restored = true;
        }

        state.update_degraded(false);
        info!("storage connection established; leaving degraded mode");
        delay = INITIAL_DELAY;

        supervise(&state, store.as_ref()).await;

        state.clear_options_store().await;
        warn!("exhausted storage reconnect attempts; staying in degraded mode");
        sleep(delay).await;
        delay = (delay * 2).min(MAX_DELAY);
    }
}

/// Poll the store's health until reconnecting fails too often.
async fn supervise(state: &SharedState, store: &dyn OptionsStore) {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                if !reconnect(state, store).await {
                    return;
                }
                state.update_degraded(false);
                sleep(HEALTH_POLL_INTERVAL).await;
            }
        }
    }
}

async fn reconnect(state: &SharedState, store: &dyn OptionsStore) -> bool {
    let mut reconnect_delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    state.update_degraded(true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(reconnect_delay).await;
                reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
            }
        }
    }

    false
}
