//! Periodic reconciliation loop.

use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::error::SyncError;
use crate::observability::metrics;
use crate::sync::runner::{CycleSummary, SyncRunner};

/// Drives [`SyncRunner`] on a fixed interval until shutdown.
///
/// A tick only fires after the previous cycle returned, so cycles never
/// overlap.
pub struct Reconciler {
    runner: SyncRunner,
    interval: Duration,
}

impl Reconciler {
    pub fn new(runner: SyncRunner, interval: Duration) -> Self {
        Self { runner, interval }
    }

    /// Run until `shutdown` fires.
    ///
    /// With `once` (or in dry-run mode) a single cycle runs and its error,
    /// if any, is returned. In loop mode cycle errors are logged and the
    /// next tick retries.
    pub async fn run(
        mut self,
        mut shutdown: broadcast::Receiver<()>,
        once: bool,
    ) -> Result<(), SyncError> {
        tracing::info!("Running initial sync");
        let first = tokio::select! {
            result = self.cycle() => result,
            _ = shutdown.recv() => {
                tracing::info!("Shutdown signal received during initial sync");
                return Ok(());
            }
        };

        if once || self.runner.is_dry_run() {
            if self.runner.is_dry_run() {
                tracing::info!("Dry run enabled, executed a single sync and exiting");
            }
            return first.map(|_| ());
        }

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            "Initial sync complete, starting sync loop"
        );
        tracing::info!("No more output will be shown until changes are detected");

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = self.cycle() => {}
                        _ = shutdown.recv() => {
                            tracing::info!("Shutdown signal received, abandoning in-flight sync");
                            break;
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, stopping sync loop");
                    break;
                }
            }
        }

        Ok(())
    }

    async fn cycle(&mut self) -> Result<CycleSummary, SyncError> {
        let started = Instant::now();
        let result = self.runner.sync_once().await;
        metrics::record_cycle(result.is_ok(), started.elapsed());

        match &result {
            Ok(summary) if summary.created + summary.deleted > 0 => tracing::info!(
                created = summary.created,
                deleted = summary.deleted,
                skipped = summary.skipped,
                "Sync complete"
            ),
            Ok(summary) => tracing::debug!(
                planned = summary.planned,
                skipped = summary.skipped,
                dry_run = summary.dry_run,
                "Sync complete"
            ),
            Err(e) => tracing::error!(error = %e, "Sync failed"),
        }
        result
    }
}
