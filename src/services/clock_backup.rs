use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, warn};

use crate::{error::ServiceError, services::clock_service, state::SharedState};

/// Periodically write the authoritative clock to storage, whatever clock sync says.
///
/// Failures are logged and retried on the next tick.
pub async fn run(state: SharedState, period: Duration) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; nothing has changed yet.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match clock_service::backup(&state).await {
            Ok(()) => debug!("judging clock backed up"),
            Err(ServiceError::Degraded) => debug!("storage unavailable; skipping clock backup"),
            Err(err) => warn!(error = %err, "clock backup failed"),
        }
    }
}
