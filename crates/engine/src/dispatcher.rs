//! Background job dispatcher.
//!
//! Polls for pending jobs on an interval and hands each claimed job to
//! the executor on its own task.  `SELECT FOR UPDATE SKIP LOCKED` in
//! [`JobRepo::claim_next`] makes claims safe under concurrent
//! dispatcher instances; a semaphore bounds in-process concurrency.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use pawtrait_db::repositories::JobRepo;
use pawtrait_db::DbPool;

use crate::config::EngineConfig;
use crate::executor::JobExecutor;

/// Long-lived task that moves pending jobs into execution.
pub struct JobDispatcher {
    pool: DbPool,
    executor: Arc<JobExecutor>,
    config: EngineConfig,
    permits: Arc<Semaphore>,
}

impl JobDispatcher {
    pub fn new(pool: DbPool, executor: Arc<JobExecutor>, config: EngineConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.max_concurrent_jobs));
        Self {
            pool,
            executor,
            config,
            permits,
        }
    }

    /// Run the dispatch loop until the cancellation token fires.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        tracing::info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            max_concurrent_jobs = self.config.max_concurrent_jobs,
            "Job dispatcher started",
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Job dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.dispatch_cycle().await {
                        tracing::error!(error = %e, "Dispatch cycle failed");
                    }
                }
            }
        }
    }

    /// One cycle: claim and spawn jobs while capacity remains.
    ///
    /// Claims only as many jobs as there are free permits, so pending
    /// rows stay claimable by other instances instead of queueing
    /// in-process.
    async fn dispatch_cycle(&self) -> Result<(), sqlx::Error> {
        loop {
            let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
                return Ok(());
            };

            let Some(job) = JobRepo::claim_next(&self.pool).await? else {
                return Ok(());
            };

            tracing::info!(job_id = job.id, job_type = %job.job_type, "Job claimed");

            let executor = Arc::clone(&self.executor);
            tokio::spawn(async move {
                executor.execute(job).await;
                drop(permit);
            });
        }
    }
}
