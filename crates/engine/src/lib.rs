//! Asynchronous job orchestration: submission façade, durable-queue
//! dispatcher, executor, and stale-job sweeper.
//!
//! Jobs are accepted by [`JobService`] (all gating happens there),
//! persisted as `Pending` rows, claimed by [`JobDispatcher`], driven by
//! [`JobExecutor`], and reconciled by [`StaleJobSweeper`] when an
//! executor dies mid-flight.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod service;
pub mod sweeper;
pub mod types;

pub use config::EngineConfig;
pub use dispatcher::JobDispatcher;
pub use error::EngineError;
pub use executor::JobExecutor;
pub use service::{CreditSummary, JobService, TrainingRequestOutcome, MIN_TRAINING_IMAGES};
pub use sweeper::StaleJobSweeper;
pub use types::{GenerateJobParams, JobView, TrainJobParams};
