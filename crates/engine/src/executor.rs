//! Job execution: drives one claimed job to a terminal state.
//!
//! Finalization is transactional: the status flip to `Completed`, the
//! credit debit, and (for generation) the asset rows commit together or
//! not at all.  A failed job therefore never charges the user and never
//! leaves partial assets behind.

use std::sync::Arc;

use pawtrait_core::credits::{GENERATION_COST, REASON_GENERATE, REASON_TRAIN, TRAINING_COST};
use pawtrait_core::error::CoreError;
use pawtrait_db::models::asset::CreateAsset;
use pawtrait_db::models::job::{Job, JobKind};
use pawtrait_db::repositories::{AssetRepo, CreditRepo, JobRepo, ModelRepo, PetRepo};
use pawtrait_db::DbPool;
use pawtrait_provider::types::TrainingState;
use pawtrait_provider::ImageProvider;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::types::{GenerateJobParams, TrainJobParams};

/// Executes claimed jobs against the configured provider.
pub struct JobExecutor {
    pool: DbPool,
    provider: Arc<dyn ImageProvider>,
    config: EngineConfig,
}

impl JobExecutor {
    pub fn new(pool: DbPool, provider: Arc<dyn ImageProvider>, config: EngineConfig) -> Self {
        Self {
            pool,
            provider,
            config,
        }
    }

    /// Run a claimed (`Processing`) job to completion or failure.
    ///
    /// Never returns an error: every failure path ends with the job
    /// marked `Failed` and, for training, its model marked failed too.
    pub async fn execute(&self, job: Job) {
        let job_id = job.id;
        tracing::info!(job_id, job_type = %job.job_type, user_id = job.user_id, "Executing job");

        let result = match job.kind() {
            Some(JobKind::Train) => self.run_train(&job).await,
            Some(JobKind::Generate) => self.run_generate(&job).await,
            None => Err(CoreError::Internal(format!("unknown job type: {}", job.job_type)).into()),
        };

        match result {
            Ok(()) => {
                tracing::info!(job_id, "Job completed");
            }
            Err(e) => {
                tracing::error!(job_id, error = %e, "Job failed");
                self.record_failure(&job, &e.to_string()).await;
            }
        }
    }

    /// Training pipeline: start the vendor run, wait for readiness,
    /// then atomically debit, publish the model, and complete the job.
    async fn run_train(&self, job: &Job) -> Result<(), EngineError> {
        let params: TrainJobParams = serde_json::from_value(job.parameters.clone())
            .map_err(|e| CoreError::Internal(format!("corrupt job parameters: {e}")))?;

        let model_id = job
            .model_id
            .ok_or_else(|| CoreError::Internal("training job has no model".into()))?;

        let pet = PetRepo::find_for_user(&self.pool, job.pet_id, job.user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "pet",
                id: job.pet_id,
            })?;

        let marked = ModelRepo::mark_training(&self.pool, model_id).await?;
        if !marked {
            // Already failed or published, e.g. by a maintenance sweep.
            return Err(CoreError::Conflict("model is no longer pending".into()).into());
        }

        let outcome = self
            .provider
            .start_training(&params.image_urls, &pet.meta())
            .await?;
        let handle = outcome.provider_model_id;

        self.wait_for_training(&handle, outcome.state).await?;

        let mut tx = self.pool.begin().await?;

        let completed = JobRepo::complete(
            &mut *tx,
            job.id,
            &serde_json::json!({ "model_id": model_id }),
        )
        .await?;
        if !completed {
            // Swept or otherwise terminal; dropping the tx rolls back.
            return Err(CoreError::Conflict("job is no longer processing".into()).into());
        }

        ModelRepo::mark_ready(&mut *tx, model_id, &handle).await?;
        CreditRepo::append(&mut tx, job.user_id, -TRAINING_COST, REASON_TRAIN).await?;

        tx.commit().await?;

        tracing::info!(job_id = job.id, model_id, "Model trained and published");
        Ok(())
    }

    /// Generation pipeline: call the vendor, then atomically record the
    /// assets, debit, and complete the job.
    async fn run_generate(&self, job: &Job) -> Result<(), EngineError> {
        let params: GenerateJobParams = serde_json::from_value(job.parameters.clone())
            .map_err(|e| CoreError::Internal(format!("corrupt job parameters: {e}")))?;

        let model_id = job
            .model_id
            .ok_or_else(|| CoreError::Internal("generation job has no model".into()))?;

        let model = ModelRepo::find_by_id(&self.pool, model_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "model",
                id: model_id,
            })?;

        let handle = model
            .provider_model_id
            .ok_or_else(|| CoreError::Internal("model has no provider handle".into()))?;

        // Only caller-supplied references condition the generation;
        // without them the provider generates from the assembled text
        // prompt alone. Uploaded pet photos are training inputs, not
        // implicit references.
        let references = params.reference_images.unwrap_or_default();

        let outcome = self
            .provider
            .generate_images(&handle, &references, &params.generation)
            .await?;

        // An empty result is a failure, not a zero-asset success: the
        // user must never be charged for nothing.
        if outcome.images.is_empty() {
            return Err(CoreError::Internal("provider returned no images".into()).into());
        }

        let mut tx = self.pool.begin().await?;

        let mut asset_ids = Vec::with_capacity(outcome.images.len());
        for image in &outcome.images {
            let asset = AssetRepo::insert(
                &mut *tx,
                &CreateAsset {
                    user_id: job.user_id,
                    pet_id: job.pet_id,
                    model_id: Some(model_id),
                    job_id: Some(job.id),
                    url: image.url.clone(),
                    thumbnail_url: None,
                    seed: image.seed,
                },
            )
            .await?;
            asset_ids.push(asset.id);
        }

        let completed = JobRepo::complete(
            &mut *tx,
            job.id,
            &serde_json::json!({
                "image_count": asset_ids.len(),
                "asset_ids": asset_ids,
            }),
        )
        .await?;
        if !completed {
            return Err(CoreError::Conflict("job is no longer processing".into()).into());
        }

        CreditRepo::append(&mut tx, job.user_id, -GENERATION_COST, REASON_GENERATE).await?;

        tx.commit().await?;

        tracing::info!(
            job_id = job.id,
            images = asset_ids.len(),
            "Generation assets recorded",
        );
        Ok(())
    }

    /// Poll the vendor until the training run is ready, fails, or the
    /// deadline elapses.
    async fn wait_for_training(
        &self,
        handle: &str,
        initial: TrainingState,
    ) -> Result<(), EngineError> {
        let deadline = tokio::time::Instant::now() + self.config.training_deadline;
        let mut state = initial;
        let mut last_error: Option<String> = None;

        loop {
            match state {
                TrainingState::Ready => return Ok(()),
                TrainingState::Failed => {
                    let message = last_error
                        .unwrap_or_else(|| "vendor reported training failure".to_string());
                    return Err(CoreError::Internal(message).into());
                }
                TrainingState::Pending | TrainingState::Training => {}
            }

            if tokio::time::Instant::now() >= deadline {
                return Err(CoreError::Internal(format!(
                    "training did not become ready within {}s",
                    self.config.training_deadline.as_secs()
                ))
                .into());
            }

            tokio::time::sleep(self.config.training_poll_interval).await;

            let status = self.provider.training_status(handle).await?;
            state = status.state;
            last_error = status.error;
        }
    }

    /// Best-effort terminal bookkeeping for a failed job.
    async fn record_failure(&self, job: &Job, error: &str) {
        if let Err(e) = JobRepo::fail(&self.pool, job.id, error).await {
            tracing::error!(job_id = job.id, error = %e, "Failed to record job failure");
        }

        if job.kind() == Some(JobKind::Train) {
            if let Some(model_id) = job.model_id {
                if let Err(e) = ModelRepo::mark_failed(&self.pool, model_id, error).await {
                    tracing::error!(
                        job_id = job.id,
                        model_id,
                        error = %e,
                        "Failed to record model failure",
                    );
                }
            }
        }
    }
}
