use std::sync::Arc;

use pawtrait_engine::JobService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: pawtrait_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Job submission façade.
    pub service: JobService,
}

impl AppState {
    pub fn new(pool: pawtrait_db::DbPool, config: ServerConfig) -> Self {
        let service = JobService::new(pool.clone());
        Self {
            pool,
            config: Arc::new(config),
            service,
        }
    }
}
