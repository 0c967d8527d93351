//! Engine tunables: dispatcher polling, concurrency, sweeper cadence.

use std::time::Duration;

use crate::error::EngineError;

/// Runtime configuration for the dispatcher, executor, and sweeper.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How often the dispatcher polls for pending jobs.
    pub poll_interval: Duration,
    /// Maximum jobs executing concurrently in this process.
    pub max_concurrent_jobs: usize,
    /// How often the sweeper reconciles stalled jobs.
    pub sweep_interval: Duration,
    /// Age past which a `Processing` job is considered abandoned.
    pub stale_after: Duration,
    /// Delay between training-status polls while a vendor run is
    /// in flight.
    pub training_poll_interval: Duration,
    /// Give up waiting for a vendor training run after this long.
    pub training_deadline: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_concurrent_jobs: 4,
            sweep_interval: Duration::from_secs(60),
            stale_after: Duration::from_secs(300),
            training_poll_interval: Duration::from_secs(3),
            training_deadline: Duration::from_secs(240),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                          | Default |
    /// |----------------------------------|---------|
    /// | `ENGINE_POLL_INTERVAL_MS`        | `1000`  |
    /// | `ENGINE_MAX_CONCURRENT_JOBS`     | `4`     |
    /// | `ENGINE_SWEEP_INTERVAL_SECS`     | `60`    |
    /// | `ENGINE_STALE_AFTER_SECS`        | `300`   |
    /// | `ENGINE_TRAINING_POLL_SECS`      | `3`     |
    /// | `ENGINE_TRAINING_DEADLINE_SECS`  | `240`   |
    pub fn from_env() -> Result<Self, EngineError> {
        let defaults = Self::default();
        Ok(Self {
            poll_interval: Duration::from_millis(env_parse(
                "ENGINE_POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )?),
            max_concurrent_jobs: env_parse(
                "ENGINE_MAX_CONCURRENT_JOBS",
                defaults.max_concurrent_jobs as u64,
            )? as usize,
            sweep_interval: Duration::from_secs(env_parse(
                "ENGINE_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval.as_secs(),
            )?),
            stale_after: Duration::from_secs(env_parse(
                "ENGINE_STALE_AFTER_SECS",
                defaults.stale_after.as_secs(),
            )?),
            training_poll_interval: Duration::from_secs(env_parse(
                "ENGINE_TRAINING_POLL_SECS",
                defaults.training_poll_interval.as_secs(),
            )?),
            training_deadline: Duration::from_secs(env_parse(
                "ENGINE_TRAINING_DEADLINE_SECS",
                defaults.training_deadline.as_secs(),
            )?),
        })
    }
}

fn env_parse(name: &str, default: u64) -> Result<u64, EngineError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| EngineError::Config(format!("{name} must be an integer, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
