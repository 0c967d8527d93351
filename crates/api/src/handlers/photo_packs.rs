//! Handler for the photo pack catalog.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/photo-packs
///
/// The style catalog. Public within the product; no per-user scoping.
pub async fn list_photo_packs(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let packs = state.service.photo_packs().await?;
    Ok(Json(DataResponse { data: packs }))
}
