//! Job submission façade.
//!
//! All acceptance gating lives here: ownership scoping, photo-count and
//! balance preconditions, duplicate-training idempotency.  Once a job
//! row exists in `Pending` the request is durably acknowledged; the
//! dispatcher picks it up from there.

use serde::Serialize;

use pawtrait_core::credits::{GENERATION_COST, TRAINING_COST};
use pawtrait_core::error::CoreError;
use pawtrait_core::types::DbId;
use pawtrait_db::models::credit::CreditEntry;
use pawtrait_db::models::job::{Job, JobKind, JobListQuery, SubmitJob};
use pawtrait_db::models::pet_model::{CreateModel, PetModel};
use pawtrait_db::models::photo_pack::PhotoPack;
use pawtrait_db::repositories::{
    AssetRepo, CreditRepo, JobRepo, ModelRepo, PetRepo, PhotoPackRepo,
};
use pawtrait_db::DbPool;
use pawtrait_provider::stability::StabilityProvider;
use pawtrait_provider::types::GenerationParams;

use crate::error::EngineError;
use crate::types::{GenerateJobParams, JobView, TrainJobParams};

/// Minimum number of uploaded photos required to train a model.
pub const MIN_TRAINING_IMAGES: usize = 3;

/// How many ledger entries a credit summary includes.
const CREDIT_HISTORY_LIMIT: i64 = 20;

/// Result of a training request. Repeat requests while a training job
/// is in flight are idempotent rather than an error.
#[derive(Debug)]
pub enum TrainingRequestOutcome {
    /// A new training job was queued.
    Submitted(Job),
    /// The pet already has a non-terminal training job; that job is
    /// returned instead of creating a duplicate.
    AlreadyQueued(Job),
    /// The pet already has a ready model; nothing was queued.
    AlreadyTrained(PetModel),
}

/// Balance plus recent ledger history.
#[derive(Debug, Serialize)]
pub struct CreditSummary {
    pub balance: i32,
    pub recent: Vec<CreditEntry>,
}

/// Entry point for everything callers do with jobs.
#[derive(Clone)]
pub struct JobService {
    pool: DbPool,
}

impl JobService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Queue a training job for a pet.
    ///
    /// Preconditions checked here, in order: the pet belongs to the
    /// caller, no training is already queued or running for it, it has
    /// no ready model yet, at least [`MIN_TRAINING_IMAGES`] photos are
    /// uploaded, and the balance covers the training cost.  Credits are
    /// not debited here; the executor debits on success only.
    pub async fn create_training_job(
        &self,
        user_id: DbId,
        pet_id: DbId,
    ) -> Result<TrainingRequestOutcome, EngineError> {
        let pet = PetRepo::find_for_user(&self.pool, pet_id, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "pet",
                id: pet_id,
            })?;

        if let Some(job) = JobRepo::find_active_train_for_pet(&self.pool, pet_id).await? {
            tracing::info!(job_id = job.id, pet_id, "Training already queued for pet");
            return Ok(TrainingRequestOutcome::AlreadyQueued(job));
        }

        if let Some(model) = ModelRepo::latest_ready_for_pet(&self.pool, pet_id).await? {
            return Ok(TrainingRequestOutcome::AlreadyTrained(model));
        }

        let uploads = AssetRepo::list_pet_uploads(&self.pool, pet_id).await?;
        if uploads.len() < MIN_TRAINING_IMAGES {
            return Err(CoreError::Validation(format!(
                "at least {MIN_TRAINING_IMAGES} uploaded photos are required to train, found {}",
                uploads.len()
            ))
            .into());
        }

        let available = CreditRepo::balance(&self.pool, user_id).await?;
        if available < TRAINING_COST {
            return Err(CoreError::InsufficientCredits {
                required: TRAINING_COST,
                available,
            }
            .into());
        }

        let parameters = serde_json::to_value(TrainJobParams {
            image_urls: uploads.into_iter().map(|a| a.url).collect(),
        })
        .map_err(|e| CoreError::Internal(format!("parameter encoding failed: {e}")))?;

        let mut tx = self.pool.begin().await?;

        let model = ModelRepo::create(
            &mut *tx,
            &CreateModel {
                pet_id,
                user_id,
                name: format!("{} model", pet.name),
                provider: StabilityProvider::NAME.to_string(),
            },
        )
        .await?;

        let submitted = JobRepo::submit(
            &mut *tx,
            &SubmitJob {
                kind: JobKind::Train,
                user_id,
                pet_id,
                model_id: Some(model.id),
                pack_id: None,
                parameters,
            },
        )
        .await;

        let job = match submitted {
            Ok(job) => job,
            // A concurrent request won the partial unique index race.
            // Roll back our model row and return the winner's job.
            Err(e) if is_unique_violation(&e) => {
                drop(tx);
                return match JobRepo::find_active_train_for_pet(&self.pool, pet_id).await? {
                    Some(job) => Ok(TrainingRequestOutcome::AlreadyQueued(job)),
                    None => Err(CoreError::Conflict(
                        "training job submission raced and lost; retry".into(),
                    )
                    .into()),
                };
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;

        tracing::info!(
            job_id = job.id,
            model_id = model.id,
            pet_id,
            user_id,
            "Training job queued",
        );
        Ok(TrainingRequestOutcome::Submitted(job))
    }

    /// Queue a generation job for a pet against a photo pack.
    ///
    /// Requires a ready model for the pet and a balance covering the
    /// generation cost. The pack's prompt template and default image
    /// count are merged into the caller's parameters; caller-supplied
    /// values win. `reference_images`, when given, switch the provider
    /// call to image-conditioned generation; otherwise it is text-only.
    pub async fn create_generation_job(
        &self,
        user_id: DbId,
        pet_id: DbId,
        pack_id: DbId,
        mut params: GenerationParams,
        reference_images: Option<Vec<String>>,
    ) -> Result<Job, EngineError> {
        PetRepo::find_for_user(&self.pool, pet_id, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "pet",
                id: pet_id,
            })?;

        let pack = PhotoPackRepo::find_by_id(&self.pool, pack_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "photo pack",
                id: pack_id,
            })?;

        let model = ModelRepo::latest_ready_for_pet(&self.pool, pet_id)
            .await?
            .ok_or_else(|| {
                CoreError::Conflict(
                    "pet has no trained model; submit a training job first".into(),
                )
            })?;

        let available = CreditRepo::balance(&self.pool, user_id).await?;
        if available < GENERATION_COST {
            return Err(CoreError::InsufficientCredits {
                required: GENERATION_COST,
                available,
            }
            .into());
        }

        if params.base_prompt.is_none() {
            params.base_prompt = Some(pack.base_prompt.clone());
        }
        if params.negative_prompt.is_none() && !pack.negative_prompt.is_empty() {
            params.negative_prompt = Some(pack.negative_prompt.clone());
        }
        if params.num_images.is_none() {
            params.num_images = Some(pack.default_num_images as u32);
        }

        let parameters = serde_json::to_value(GenerateJobParams {
            generation: params,
            reference_images,
        })
        .map_err(|e| CoreError::Internal(format!("parameter encoding failed: {e}")))?;

        let job = JobRepo::submit(
            &self.pool,
            &SubmitJob {
                kind: JobKind::Generate,
                user_id,
                pet_id,
                model_id: Some(model.id),
                pack_id: Some(pack.id),
                parameters,
            },
        )
        .await?;

        tracing::info!(
            job_id = job.id,
            pet_id,
            pack = %pack.slug,
            user_id,
            "Generation job queued",
        );
        Ok(job)
    }

    /// A job's current state plus any assets it produced, scoped to the
    /// owner. Foreign and missing jobs are indistinguishable.
    pub async fn job_status(&self, user_id: DbId, job_id: DbId) -> Result<JobView, EngineError> {
        let job = JobRepo::find_for_user(&self.pool, job_id, user_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "job",
                id: job_id,
            })?;

        let assets = AssetRepo::list_by_job(&self.pool, job.id).await?;
        Ok(JobView { job, assets })
    }

    /// The caller's jobs, newest first.
    pub async fn list_jobs(
        &self,
        user_id: DbId,
        query: &JobListQuery,
    ) -> Result<Vec<Job>, EngineError> {
        Ok(JobRepo::list_by_user(&self.pool, user_id, query).await?)
    }

    /// The photo pack catalog.
    pub async fn photo_packs(&self) -> Result<Vec<PhotoPack>, EngineError> {
        Ok(PhotoPackRepo::list(&self.pool).await?)
    }

    /// Current balance and recent ledger entries for the caller.
    pub async fn credit_summary(&self, user_id: DbId) -> Result<CreditSummary, EngineError> {
        let balance = CreditRepo::balance(&self.pool, user_id).await?;
        let recent = CreditRepo::list_recent(&self.pool, user_id, CREDIT_HISTORY_LIMIT).await?;
        Ok(CreditSummary { balance, recent })
    }
}

/// Postgres unique-constraint violation (SQLSTATE 23505).
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}
