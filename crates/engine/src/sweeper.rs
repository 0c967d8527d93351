//! Stale-job sweeper.
//!
//! A claimed job only stays in `Processing` past the staleness
//! threshold if the task driving it died (process crash, executor
//! panic).  The sweeper periodically force-fails such jobs so the
//! durable queue converges to a terminal state for every submission.

use tokio_util::sync::CancellationToken;

use pawtrait_db::repositories::JobRepo;
use pawtrait_db::DbPool;

use crate::config::EngineConfig;

/// Long-lived reconciliation task for abandoned jobs.
pub struct StaleJobSweeper {
    pool: DbPool,
    config: EngineConfig,
}

impl StaleJobSweeper {
    pub fn new(pool: DbPool, config: EngineConfig) -> Self {
        Self { pool, config }
    }

    /// Run the sweep loop until the cancellation token fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.sweep_interval);
        tracing::info!(
            sweep_interval_secs = self.config.sweep_interval.as_secs(),
            stale_after_secs = self.config.stale_after.as_secs(),
            "Stale-job sweeper started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Stale-job sweeper shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// One sweep pass. Errors are logged, never fatal to the loop.
    pub async fn sweep_once(&self) {
        match JobRepo::fail_stale(&self.pool, self.config.stale_after.as_secs() as i64).await {
            Ok(swept) if swept.is_empty() => {}
            Ok(swept) => {
                tracing::warn!(count = swept.len(), job_ids = ?swept, "Swept stalled jobs");
            }
            Err(e) => {
                tracing::error!(error = %e, "Stale-job sweep failed");
            }
        }
    }
}
