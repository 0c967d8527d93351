//! Repository for the `pets` table (read side; pets are managed by the
//! web layer).

use sqlx::PgPool;

use pawtrait_core::types::DbId;

use crate::models::pet::Pet;

/// Column list for `pets` queries.
const COLUMNS: &str = "\
    id, user_id, name, species, breed, coat_color, gender, created_at, updated_at";

pub struct PetRepo;

impl PetRepo {
    /// Find a pet by ID, scoped to its owner. A foreign pet is
    /// indistinguishable from a missing one.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Pet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pets WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Pet>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a pet (test/collaborator helper).
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
        species: &str,
        breed: Option<&str>,
        coat_color: Option<&str>,
    ) -> Result<Pet, sqlx::Error> {
        let query = format!(
            "INSERT INTO pets (user_id, name, species, breed, coat_color) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pet>(&query)
            .bind(user_id)
            .bind(name)
            .bind(species)
            .bind(breed)
            .bind(coat_color)
            .fetch_one(pool)
            .await
    }
}
