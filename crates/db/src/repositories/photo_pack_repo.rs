//! Repository for the `photo_packs` catalog.

use sqlx::PgPool;

use pawtrait_core::types::DbId;

use crate::models::photo_pack::PhotoPack;

/// Column list for `photo_packs` queries.
const COLUMNS: &str = "\
    id, slug, name, description, base_prompt, negative_prompt, \
    default_num_images, species_support, created_at";

/// Read access to the pack catalog (packs are seeded by migration).
pub struct PhotoPackRepo;

impl PhotoPackRepo {
    /// All packs, in catalog order.
    pub async fn list(pool: &PgPool) -> Result<Vec<PhotoPack>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM photo_packs ORDER BY id ASC");
        sqlx::query_as::<_, PhotoPack>(&query).fetch_all(pool).await
    }

    /// Find a pack by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PhotoPack>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM photo_packs WHERE id = $1");
        sqlx::query_as::<_, PhotoPack>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
