//! Handlers for the `/jobs` resource.
//!
//! All endpoints require authentication via [`AuthUser`]; users see
//! only their own jobs.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;

use pawtrait_core::types::DbId;
use pawtrait_db::models::job::JobListQuery;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/jobs
///
/// List the caller's jobs, newest first. Supports optional `status_id`,
/// `limit`, and `offset` query parameters.
pub async fn list_jobs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<JobListQuery>,
) -> AppResult<impl IntoResponse> {
    let jobs = state.service.list_jobs(auth.user_id, &params).await?;
    Ok(Json(DataResponse { data: jobs }))
}

/// GET /api/v1/jobs/{id}
///
/// A job's current state plus any assets it produced. Another user's
/// job returns 404, indistinguishable from a missing one.
pub async fn get_job(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let view = state.service.job_status(auth.user_id, job_id).await?;
    Ok(Json(DataResponse { data: view }))
}
