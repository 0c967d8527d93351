//! Handlers for pet-scoped job submission.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use pawtrait_core::types::DbId;
use pawtrait_db::models::job::Job;
use pawtrait_db::models::pet_model::PetModel;
use pawtrait_engine::TrainingRequestOutcome;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response payload for a training request.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TrainResponse {
    /// A new training job was queued.
    Queued { job: Job },
    /// An earlier training job is still in flight; returned as-is.
    AlreadyQueued { job: Job },
    /// The pet already has a ready model.
    AlreadyTrained { model: PetModel },
}

/// POST /api/v1/pets/{id}/train
///
/// Queue a training job for the pet. Returns 201 when a new job was
/// created, 200 when the request was satisfied by existing state
/// (training in flight or model already ready).
pub async fn train_pet(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(pet_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .service
        .create_training_job(auth.user_id, pet_id)
        .await?;

    let (status, response) = match outcome {
        TrainingRequestOutcome::Submitted(job) => {
            (StatusCode::CREATED, TrainResponse::Queued { job })
        }
        TrainingRequestOutcome::AlreadyQueued(job) => {
            (StatusCode::OK, TrainResponse::AlreadyQueued { job })
        }
        TrainingRequestOutcome::AlreadyTrained(model) => {
            (StatusCode::OK, TrainResponse::AlreadyTrained { model })
        }
    };

    Ok((status, Json(DataResponse { data: response })))
}
