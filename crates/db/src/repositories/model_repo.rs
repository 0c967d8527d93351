//! Repository for the `pet_models` table.
//!
//! A model is mutated only by the training job that owns it; the guarded
//! transitions here mirror `Pending -> Training -> {Ready, Failed}`.

use sqlx::{PgExecutor, PgPool};

use pawtrait_core::types::DbId;

use crate::models::pet_model::{CreateModel, PetModel};
use crate::models::status::ModelStatus;

/// Column list for `pet_models` queries.
const COLUMNS: &str = "\
    id, pet_id, user_id, name, provider, provider_model_id, \
    status_id, error_message, created_at, updated_at";

/// Provides CRUD operations for per-pet models.
pub struct ModelRepo;

impl ModelRepo {
    /// Insert a new pending model at training-job creation time.
    pub async fn create<'e>(
        exec: impl PgExecutor<'e>,
        input: &CreateModel,
    ) -> Result<PetModel, sqlx::Error> {
        let query = format!(
            "INSERT INTO pet_models (pet_id, user_id, name, provider, status_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PetModel>(&query)
            .bind(input.pet_id)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.provider)
            .bind(ModelStatus::Pending.id())
            .fetch_one(exec)
            .await
    }

    /// Find a model by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PetModel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pet_models WHERE id = $1");
        sqlx::query_as::<_, PetModel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The pet's most recently created `Ready` model, if any.
    pub async fn latest_ready_for_pet(
        pool: &PgPool,
        pet_id: DbId,
    ) -> Result<Option<PetModel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM pet_models \
             WHERE pet_id = $1 AND status_id = $2 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, PetModel>(&query)
            .bind(pet_id)
            .bind(ModelStatus::Ready.id())
            .fetch_optional(pool)
            .await
    }

    /// Move a pending model to `Training`. Returns `false` if the model
    /// was not pending.
    pub async fn mark_training<'e>(
        exec: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE pet_models SET status_id = $2 WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(ModelStatus::Training.id())
        .bind(ModelStatus::Pending.id())
        .execute(exec)
        .await?;
        Ok(updated.rows_affected() > 0)
    }

    /// Record the provider handle and move a training model to `Ready`.
    pub async fn mark_ready<'e>(
        exec: impl PgExecutor<'e>,
        id: DbId,
        provider_model_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE pet_models \
             SET status_id = $2, provider_model_id = $3, error_message = NULL \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(ModelStatus::Ready.id())
        .bind(provider_model_id)
        .bind(ModelStatus::Training.id())
        .execute(exec)
        .await?;
        Ok(updated.rows_affected() > 0)
    }

    /// Fail a model from either `Pending` or `Training`, capturing the
    /// error text.
    pub async fn mark_failed<'e>(
        exec: impl PgExecutor<'e>,
        id: DbId,
        error: &str,
    ) -> Result<bool, sqlx::Error> {
        let updated = sqlx::query(
            "UPDATE pet_models \
             SET status_id = $2, error_message = $3 \
             WHERE id = $1 AND status_id IN ($4, $5)",
        )
        .bind(id)
        .bind(ModelStatus::Failed.id())
        .bind(error)
        .bind(ModelStatus::Pending.id())
        .bind(ModelStatus::Training.id())
        .execute(exec)
        .await?;
        Ok(updated.rows_affected() > 0)
    }
}
