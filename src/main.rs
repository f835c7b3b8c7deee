//! Jury options binary entrypoint wiring storage supervision and the clock backup.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jury_options::{
    config::AppConfig,
    dao::options_store::StoreBackend,
    services::{clock_backup, clock_service, reassign::NoopReassigner, storage_supervisor},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let state = AppState::new(AppConfig::load(), Arc::new(NoopReassigner));
    let backup_interval = state.config().clock_backup_interval();
    let backend = StoreBackend::from_env();
    info!("starting jury options service");

    let supervisor = tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let backend = backend.clone();
        async move { backend.connect().await }
    }));
    let backup = tokio::spawn(clock_backup::run(state.clone(), backup_interval));

    shutdown_signal().await?;
    info!("shutdown requested");

    backup.abort();
    supervisor.abort();

    // Persist the clock one last time so a restart resumes from here.
    if let Err(err) = clock_service::backup(&state).await {
        warn!(error = %err, "final clock backup failed");
    }

    Ok(())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() -> anyhow::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("waiting for Ctrl+C")?,
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.context("waiting for Ctrl+C")?;
    }

    Ok(())
}
