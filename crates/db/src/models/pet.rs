//! Pet entity (owned by the web layer; read-only for the job system).

use pawtrait_core::pet::{PetMeta, PetSpecies};
use pawtrait_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Pet {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub species: String,
    pub breed: Option<String>,
    pub coat_color: Option<String>,
    pub gender: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Pet {
    /// Provider-facing metadata derived from this row. Unknown species
    /// values fall back to `Other` rather than failing the job.
    pub fn meta(&self) -> PetMeta {
        PetMeta {
            name: self.name.clone(),
            species: PetSpecies::parse(&self.species).unwrap_or(PetSpecies::Other),
            breed: self.breed.clone(),
            coat_color: self.coat_color.clone(),
            gender: self.gender.clone(),
        }
    }
}
