//! Identity extractor for Axum handlers.
//!
//! This service sits behind an authenticating gateway that resolves the
//! session and forwards the account id in the `x-user-id` header.
//! Requests reaching this process without the header (or with a
//! non-numeric value) are rejected as unauthenticated.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use pawtrait_core::error::CoreError;
use pawtrait_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the gateway-resolved account id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated user extracted from the forwarded identity header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    /// The user's internal database id.
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {USER_ID_HEADER} header"
                )))
            })?;

        let user_id: DbId = raw.parse().map_err(|_| {
            AppError::Core(CoreError::Unauthorized(format!(
                "Invalid {USER_ID_HEADER} header"
            )))
        })?;

        Ok(AuthUser { user_id })
    }
}
