//! `gridctl agent run`: starts the Orchestration Facade event loop for this
//! machine and blocks until SIGINT/SIGTERM, then drains.

use std::time::Duration;

use tracing::info;

use crate::config::ConfigProvider;
use crate::error::CliError;
use crate::startup;

/// Shutdown drain timeout, configurable via `GRIDCOMPUTE_DRAIN_TIMEOUT_MS`
/// (default 30s) — matching the teacher's `OJ_DRAIN_TIMEOUT_MS` idiom, but
/// longer since a case's `process` step can itself run for minutes.
fn drain_timeout() -> Duration {
    std::env::var("GRIDCOMPUTE_DRAIN_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

pub async fn run(config_provider: &dyn ConfigProvider, capacity: usize) -> Result<(), CliError> {
    let config = config_provider.load().await?;
    let ctx = startup::build(&config, capacity).await?;

    info!(
        machine = %config.machine,
        applications = ?config.supported_applications(),
        "starting orchestration facade"
    );

    let handle = ctx.scheduler.spawn();

    wait_for_shutdown_signal().await?;
    info!("shutdown signal received, draining");

    handle.shutdown().await;

    let deadline = tokio::time::Instant::now() + drain_timeout();
    while ctx.scheduler.active_claim_count() > 0 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    let remaining = ctx.scheduler.active_claim_count();
    if remaining > 0 {
        tracing::warn!(remaining, "drain timeout elapsed with claims still active");
    } else {
        info!("drained cleanly");
    }

    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<(), CliError> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<(), CliError> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
