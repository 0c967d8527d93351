//! Repository for the `assets` table.

use sqlx::{PgExecutor, PgPool};

use pawtrait_core::types::DbId;

use crate::models::asset::{Asset, CreateAsset, ASSET_KIND_IMAGE};

/// Column list for `assets` queries.
const COLUMNS: &str = "\
    id, user_id, pet_id, model_id, job_id, kind, url, thumbnail_url, seed, created_at";

/// Provides insert and lookup operations for assets.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert a generated image asset.
    pub async fn insert<'e>(
        exec: impl PgExecutor<'e>,
        input: &CreateAsset,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (user_id, pet_id, model_id, job_id, kind, url, thumbnail_url, seed) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(input.user_id)
            .bind(input.pet_id)
            .bind(input.model_id)
            .bind(input.job_id)
            .bind(ASSET_KIND_IMAGE)
            .bind(&input.url)
            .bind(&input.thumbnail_url)
            .bind(input.seed)
            .fetch_one(exec)
            .await
    }

    /// All assets produced by a job, oldest first.
    pub async fn list_by_job(pool: &PgPool, job_id: DbId) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE job_id = $1 ORDER BY id ASC");
        sqlx::query_as::<_, Asset>(&query)
            .bind(job_id)
            .fetch_all(pool)
            .await
    }

    /// The pet's uploaded photos (assets not produced by any job),
    /// newest first. These are the training inputs.
    pub async fn list_pet_uploads(pool: &PgPool, pet_id: DbId) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assets \
             WHERE pet_id = $1 AND job_id IS NULL AND kind = $2 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(pet_id)
            .bind(ASSET_KIND_IMAGE)
            .fetch_all(pool)
            .await
    }

    /// Record an uploaded pet photo (test/collaborator helper; uploads
    /// themselves happen in the web layer).
    pub async fn insert_upload(
        pool: &PgPool,
        user_id: DbId,
        pet_id: DbId,
        url: &str,
    ) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (user_id, pet_id, kind, url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(user_id)
            .bind(pet_id)
            .bind(ASSET_KIND_IMAGE)
            .bind(url)
            .fetch_one(pool)
            .await
    }
}
