//! Repository for the `characters` table.

use personafy_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::Character;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, anime_series, image_url, costume_description, prompt_template, created_at";

/// Read-only access to the character catalogue.
pub struct CharacterRepo;

impl CharacterRepo {
    /// Find a character by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every character, ordered by name ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters ORDER BY name ASC");
        sqlx::query_as::<_, Character>(&query).fetch_all(pool).await
    }
}
