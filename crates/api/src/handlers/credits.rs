//! Handler for the caller's credit balance and history.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/credits
///
/// Current balance (derived from the latest ledger entry) plus recent
/// ledger history.
pub async fn get_credits(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let summary = state.service.credit_summary(auth.user_id).await?;
    Ok(Json(DataResponse { data: summary }))
}
