//! Route composition.

pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{credits, generation, jobs, pets, photo_packs};
use crate::state::AppState;

/// Routes mounted under `/api/v1`.
///
/// ```text
/// POST   /pets/{id}/train   -> pets::train_pet
/// POST   /generate          -> generation::generate
/// GET    /jobs              -> jobs::list_jobs
/// GET    /jobs/{id}         -> jobs::get_job
/// GET    /photo-packs       -> photo_packs::list_photo_packs
/// GET    /credits           -> credits::get_credits
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/pets/{id}/train", post(pets::train_pet))
        .route("/generate", post(generation::generate))
        .route("/jobs", get(jobs::list_jobs))
        .route("/jobs/{id}", get(jobs::get_job))
        .route("/photo-packs", get(photo_packs::list_photo_packs))
        .route("/credits", get(credits::get_credits))
}

/// The full application router: health at root level, everything else
/// under `/api/v1`. Middleware layers are applied by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1", api_routes())
        .with_state(state)
}
