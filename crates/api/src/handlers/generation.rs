//! Handler for generation job submission.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use pawtrait_core::types::DbId;
use pawtrait_provider::types::GenerationParams;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for POST /api/v1/generate.
///
/// Prompt templates come from the selected pack; callers may only tune
/// the numeric knobs. Unset fields fall back to the pack's defaults and
/// then the provider's.
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateRequest {
    pub pet_id: DbId,
    pub pack_id: DbId,
    #[validate(range(min = 1, max = 10))]
    pub num_images: Option<u32>,
    #[validate(range(min = 1.0, max = 35.0))]
    pub cfg_scale: Option<f32>,
    #[validate(range(min = 10, max = 150))]
    pub steps: Option<u32>,
    pub seed: Option<u64>,
    /// Explicit reference images for image-conditioned generation;
    /// omitted means text-only generation.
    #[validate(length(max = 3))]
    pub reference_images: Option<Vec<String>>,
}

/// POST /api/v1/generate
///
/// Queue a generation job. Returns 201 with the pending job; progress
/// and results are read from GET /api/v1/jobs/{id}.
pub async fn generate(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<GenerateRequest>,
) -> AppResult<impl IntoResponse> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let params = GenerationParams {
        num_images: input.num_images,
        cfg_scale: input.cfg_scale,
        steps: input.steps,
        seed: input.seed,
        ..Default::default()
    };

    let job = state
        .service
        .create_generation_job(
            auth.user_id,
            input.pet_id,
            input.pack_id,
            params,
            input.reference_images,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}
