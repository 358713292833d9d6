//! Character entity model.

use personafy_core::prompt::PromptCharacter;
use personafy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A character row from the `characters` table. Read-only to the service.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub name: String,
    pub anime_series: String,
    /// Reference artwork shown in the character picker.
    pub image_url: String,
    pub costume_description: Option<String>,
    pub prompt_template: Option<String>,
    pub created_at: Timestamp,
}

impl Character {
    /// The styling fields used to build a transformation prompt.
    pub fn prompt_fields(&self) -> PromptCharacter<'_> {
        PromptCharacter {
            name: &self.name,
            series: &self.anime_series,
            costume_description: self.costume_description.as_deref(),
            prompt_template: self.prompt_template.as_deref(),
        }
    }
}
