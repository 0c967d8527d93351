//! Photo pack entity: a named style template (prompt + negative prompt
//! + defaults) selectable at generation time.

use pawtrait_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `photo_packs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PhotoPack {
    pub id: DbId,
    pub slug: String,
    pub name: String,
    pub description: String,
    pub base_prompt: String,
    pub negative_prompt: String,
    pub default_num_images: i32,
    pub species_support: String,
    pub created_at: Timestamp,
}
