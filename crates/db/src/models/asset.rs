//! Asset entity: uploaded pet photos and generated images.

use pawtrait_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Asset kind stored in `assets.kind`. Only images exist today.
pub const ASSET_KIND_IMAGE: &str = "image";

/// A row from the `assets` table.
///
/// Uploaded pet photos have `job_id IS NULL`; generated images carry the
/// generation job that produced them. Rows are immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub user_id: DbId,
    pub pet_id: DbId,
    pub model_id: Option<DbId>,
    pub job_id: Option<DbId>,
    pub kind: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub seed: Option<i64>,
    pub created_at: Timestamp,
}

/// DTO for inserting a generated image.
#[derive(Debug)]
pub struct CreateAsset {
    pub user_id: DbId,
    pub pet_id: DbId,
    pub model_id: Option<DbId>,
    pub job_id: Option<DbId>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub seed: Option<i64>,
}
