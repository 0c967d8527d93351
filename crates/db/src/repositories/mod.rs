//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Reads take `&PgPool`; mutators that participate in the executor's
//! finalization transaction take `impl PgExecutor` so they can run on
//! either a pool or an open transaction.

pub mod asset_repo;
pub mod credit_repo;
pub mod job_repo;
pub mod model_repo;
pub mod pet_repo;
pub mod photo_pack_repo;
pub mod user_repo;

pub use asset_repo::AssetRepo;
pub use credit_repo::CreditRepo;
pub use job_repo::JobRepo;
pub use model_repo::ModelRepo;
pub use pet_repo::PetRepo;
pub use photo_pack_repo::PhotoPackRepo;
pub use user_repo::UserRepo;
