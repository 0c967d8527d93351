//! Per-pet trained model entity.

use pawtrait_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use super::status::StatusId;

/// A row from the `pet_models` table.
///
/// `provider_model_id` is the opaque vendor handle; it is NULL until the
/// training job that owns this model reaches `Ready`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PetModel {
    pub id: DbId,
    pub pet_id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub provider: String,
    pub provider_model_id: Option<String>,
    pub status_id: StatusId,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new model at training-job creation time.
#[derive(Debug)]
pub struct CreateModel {
    pub pet_id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub provider: String,
}
