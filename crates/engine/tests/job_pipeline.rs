//! End-to-end pipeline tests: submission gating, execution, and
//! transactional finalization, with a stub provider standing in for the
//! vendor API.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use sqlx::PgPool;

use pawtrait_core::credits::{REASON_SIGNUP_BONUS, SIGNUP_BONUS};
use pawtrait_core::error::CoreError;
use pawtrait_core::pet::PetMeta;
use pawtrait_db::models::pet_model::CreateModel;
use pawtrait_db::models::status::{JobStatus, ModelStatus};
use pawtrait_db::repositories::{
    AssetRepo, CreditRepo, JobRepo, ModelRepo, PetRepo, UserRepo,
};
use pawtrait_engine::{
    EngineConfig, EngineError, JobExecutor, JobService, TrainingRequestOutcome,
};
use pawtrait_provider::error::ProviderError;
use pawtrait_provider::types::{
    GeneratedImage, GenerationOutcome, GenerationParams, TrainingOutcome, TrainingState,
    TrainingStatus,
};
use pawtrait_provider::ImageProvider;

// ---------------------------------------------------------------------------
// Stub provider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StubProvider {
    fail_training: bool,
    fail_generation: bool,
    /// References received by the last `generate_images` call.
    seen_references: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ImageProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn start_training(
        &self,
        images: &[String],
        _meta: &PetMeta,
    ) -> Result<TrainingOutcome, ProviderError> {
        if self.fail_training {
            return Err(ProviderError::Api {
                status: 500,
                body: "training backend down".to_string(),
            });
        }
        Ok(TrainingOutcome {
            provider_model_id: format!("stub:model-{}", images.len()),
            state: TrainingState::Ready,
            estimated_secs: Some(0),
        })
    }

    async fn training_status(
        &self,
        _provider_model_id: &str,
    ) -> Result<TrainingStatus, ProviderError> {
        Ok(TrainingStatus {
            state: TrainingState::Ready,
            progress: Some(100),
            error: None,
        })
    }

    async fn generate_images(
        &self,
        _provider_model_id: &str,
        reference_images: &[String],
        params: &GenerationParams,
    ) -> Result<GenerationOutcome, ProviderError> {
        *self.seen_references.lock().unwrap() = reference_images.to_vec();
        if self.fail_generation {
            return Err(ProviderError::Timeout { timeout_secs: 120 });
        }
        let resolved = params.resolve();
        Ok(GenerationOutcome {
            images: (0..resolved.num_images)
                .map(|i| GeneratedImage {
                    url: format!("https://cdn.example/generated/{i}.png"),
                    seed: Some(i as i64),
                })
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_user_and_pet(pool: &PgPool) -> (i64, i64) {
    let user = UserRepo::create(pool, "owner@example.com", "Owner")
        .await
        .expect("create user");
    let pet = PetRepo::create(pool, user.id, "Rex", "dog", Some("Labrador"), Some("golden"))
        .await
        .expect("create pet");
    (user.id, pet.id)
}

async fn upload_photos(pool: &PgPool, user_id: i64, pet_id: i64, count: usize) {
    for i in 0..count {
        AssetRepo::insert_upload(pool, user_id, pet_id, &format!("https://cdn.example/{i}.png"))
            .await
            .expect("insert upload");
    }
}

/// Insert a model already published as `Ready`, bypassing training.
async fn seed_ready_model(pool: &PgPool, user_id: i64, pet_id: i64) -> i64 {
    let model = ModelRepo::create(
        pool,
        &CreateModel {
            pet_id,
            user_id,
            name: "Rex model".to_string(),
            provider: "stub".to_string(),
        },
    )
    .await
    .unwrap();
    ModelRepo::mark_training(pool, model.id).await.unwrap();
    ModelRepo::mark_ready(pool, model.id, "stub:model-3").await.unwrap();
    model.id
}

/// Claim the oldest pending job and drive it to a terminal state.
async fn run_next_job(pool: &PgPool, provider: StubProvider) {
    let executor = JobExecutor::new(pool.clone(), Arc::new(provider), EngineConfig::default());
    let job = JobRepo::claim_next(pool)
        .await
        .unwrap()
        .expect("a pending job to claim");
    executor.execute(job).await;
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn training_job_completes_and_debits_ten_credits(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, 12, REASON_SIGNUP_BONUS).await.unwrap();

    let service = JobService::new(pool.clone());
    let outcome = service.create_training_job(user_id, pet_id).await.unwrap();
    let job = assert_matches!(outcome, TrainingRequestOutcome::Submitted(job) => job);
    assert_eq!(job.status_id, JobStatus::Pending.id());

    run_next_job(&pool, StubProvider::default()).await;

    let view = service.job_status(user_id, job.id).await.unwrap();
    assert_eq!(view.job.status_id, JobStatus::Completed.id());

    let model = ModelRepo::find_by_id(&pool, job.model_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(model.status_id, ModelStatus::Ready.id());
    assert_eq!(model.provider_model_id.as_deref(), Some("stub:model-3"));

    // 12 - 10, debited exactly once, on completion.
    assert_eq!(CreditRepo::balance(&pool, user_id).await.unwrap(), 2);
    assert_eq!(CreditRepo::count_debits(&pool, user_id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn training_rejected_when_balance_below_cost(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, 4, REASON_SIGNUP_BONUS).await.unwrap();

    let service = JobService::new(pool.clone());
    let err = service.create_training_job(user_id, pet_id).await.unwrap_err();
    assert_matches!(
        err,
        EngineError::Core(CoreError::InsufficientCredits {
            required: 10,
            available: 4,
        })
    );

    // Rejection leaves no queue entry and no charge.
    assert!(JobRepo::claim_next(&pool).await.unwrap().is_none());
    assert_eq!(CreditRepo::balance(&pool, user_id).await.unwrap(), 4);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn training_requires_three_uploaded_photos(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 2).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();

    let service = JobService::new(pool.clone());
    let err = service.create_training_job(user_id, pet_id).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn repeat_training_request_returns_the_queued_job(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();

    let service = JobService::new(pool.clone());
    let first = assert_matches!(
        service.create_training_job(user_id, pet_id).await.unwrap(),
        TrainingRequestOutcome::Submitted(job) => job
    );
    let second = assert_matches!(
        service.create_training_job(user_id, pet_id).await.unwrap(),
        TrainingRequestOutcome::AlreadyQueued(job) => job
    );
    assert_eq!(first.id, second.id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn training_a_trained_pet_reports_existing_model(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();
    let model_id = seed_ready_model(&pool, user_id, pet_id).await;

    let service = JobService::new(pool.clone());
    let model = assert_matches!(
        service.create_training_job(user_id, pet_id).await.unwrap(),
        TrainingRequestOutcome::AlreadyTrained(model) => model
    );
    assert_eq!(model.id, model_id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn training_failure_fails_model_and_charges_nothing(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();

    let service = JobService::new(pool.clone());
    let job = assert_matches!(
        service.create_training_job(user_id, pet_id).await.unwrap(),
        TrainingRequestOutcome::Submitted(job) => job
    );

    run_next_job(
        &pool,
        StubProvider {
            fail_training: true,
            ..Default::default()
        },
    )
    .await;

    let view = service.job_status(user_id, job.id).await.unwrap();
    assert_eq!(view.job.status_id, JobStatus::Failed.id());
    assert!(view.job.error_message.unwrap().contains("500"));

    let model = ModelRepo::find_by_id(&pool, job.model_id.unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(model.status_id, ModelStatus::Failed.id());

    assert_eq!(CreditRepo::balance(&pool, user_id).await.unwrap(), 20);
    assert_eq!(CreditRepo::count_debits(&pool, user_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn training_aborts_when_model_already_left_pending(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();

    let service = JobService::new(pool.clone());
    let job = assert_matches!(
        service.create_training_job(user_id, pet_id).await.unwrap(),
        TrainingRequestOutcome::Submitted(job) => job
    );

    // A maintenance sweep fails the model while the job is still queued.
    let model_id = job.model_id.unwrap();
    ModelRepo::mark_failed(&pool, model_id, "training job stalled; reset by maintenance sweep")
        .await
        .unwrap();

    run_next_job(&pool, StubProvider::default()).await;

    // The run aborts before any provider work; no charge, and the
    // model keeps the sweep's failure record.
    let view = service.job_status(user_id, job.id).await.unwrap();
    assert_eq!(view.job.status_id, JobStatus::Failed.id());

    let model = ModelRepo::find_by_id(&pool, model_id).await.unwrap().unwrap();
    assert_eq!(model.status_id, ModelStatus::Failed.id());
    assert!(model.error_message.unwrap().contains("stalled"));

    assert_eq!(CreditRepo::count_debits(&pool, user_id).await.unwrap(), 0);
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn generation_job_records_assets_and_debits_five_credits(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();
    seed_ready_model(&pool, user_id, pet_id).await;

    let service = JobService::new(pool.clone());
    let packs = service.photo_packs().await.unwrap();
    let pack = &packs[0];

    let job = service
        .create_generation_job(user_id, pet_id, pack.id, GenerationParams::default(), None)
        .await
        .unwrap();
    assert_eq!(job.pack_id, Some(pack.id));

    run_next_job(&pool, StubProvider::default()).await;

    let view = service.job_status(user_id, job.id).await.unwrap();
    assert_eq!(view.job.status_id, JobStatus::Completed.id());
    // The pack's default image count flows through to the assets.
    assert_eq!(view.assets.len(), pack.default_num_images as usize);
    assert!(view.assets.iter().all(|a| a.job_id == Some(job.id)));

    assert_eq!(CreditRepo::balance(&pool, user_id).await.unwrap(), 15);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generation_without_ready_model_is_rejected(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();

    let service = JobService::new(pool.clone());
    let packs = service.photo_packs().await.unwrap();

    let err = service
        .create_generation_job(user_id, pet_id, packs[0].id, GenerationParams::default(), None)
        .await
        .unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::Conflict(_)));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generation_rejected_when_balance_below_cost(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    CreditRepo::grant(&pool, user_id, 4, REASON_SIGNUP_BONUS).await.unwrap();
    seed_ready_model(&pool, user_id, pet_id).await;

    let service = JobService::new(pool.clone());
    let packs = service.photo_packs().await.unwrap();

    let err = service
        .create_generation_job(user_id, pet_id, packs[0].id, GenerationParams::default(), None)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        EngineError::Core(CoreError::InsufficientCredits {
            required: 5,
            available: 4,
        })
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_generation_leaves_no_assets_and_no_debit(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();
    seed_ready_model(&pool, user_id, pet_id).await;

    let service = JobService::new(pool.clone());
    let packs = service.photo_packs().await.unwrap();
    let job = service
        .create_generation_job(user_id, pet_id, packs[0].id, GenerationParams::default(), None)
        .await
        .unwrap();

    run_next_job(
        &pool,
        StubProvider {
            fail_generation: true,
            ..Default::default()
        },
    )
    .await;

    let view = service.job_status(user_id, job.id).await.unwrap();
    assert_eq!(view.job.status_id, JobStatus::Failed.id());
    assert!(view.assets.is_empty());

    assert_eq!(CreditRepo::balance(&pool, user_id).await.unwrap(), 20);
    assert_eq!(CreditRepo::count_debits(&pool, user_id).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn generation_without_references_is_text_only(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();
    seed_ready_model(&pool, user_id, pet_id).await;

    let service = JobService::new(pool.clone());
    let packs = service.photo_packs().await.unwrap();
    service
        .create_generation_job(user_id, pet_id, packs[0].id, GenerationParams::default(), None)
        .await
        .unwrap();

    let provider = StubProvider::default();
    let seen = Arc::clone(&provider.seen_references);
    run_next_job(&pool, provider).await;

    // Uploaded pet photos are training inputs only; a reference-less
    // request reaches the provider with no images to condition on.
    assert!(seen.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn explicit_reference_images_reach_the_provider(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();
    seed_ready_model(&pool, user_id, pet_id).await;

    let service = JobService::new(pool.clone());
    let packs = service.photo_packs().await.unwrap();
    service
        .create_generation_job(
            user_id,
            pet_id,
            packs[0].id,
            GenerationParams::default(),
            Some(vec!["https://cdn.example/ref.png".to_string()]),
        )
        .await
        .unwrap();

    let provider = StubProvider::default();
    let seen = Arc::clone(&provider.seen_references);
    run_next_job(&pool, provider).await;

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["https://cdn.example/ref.png".to_string()]
    );
}

// ---------------------------------------------------------------------------
// Status lookups
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn foreign_job_status_is_not_found(pool: PgPool) {
    let (user_id, pet_id) = seed_user_and_pet(&pool).await;
    upload_photos(&pool, user_id, pet_id, 3).await;
    CreditRepo::grant(&pool, user_id, SIGNUP_BONUS, REASON_SIGNUP_BONUS).await.unwrap();
    let stranger = UserRepo::create(&pool, "stranger@example.com", "Stranger")
        .await
        .unwrap();

    let service = JobService::new(pool.clone());
    let job = assert_matches!(
        service.create_training_job(user_id, pet_id).await.unwrap(),
        TrainingRequestOutcome::Submitted(job) => job
    );

    let err = service.job_status(stranger.id, job.id).await.unwrap_err();
    assert_matches!(err, EngineError::Core(CoreError::NotFound { entity: "job", .. }));
}
