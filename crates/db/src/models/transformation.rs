//! Transformation entity model and DTOs.

use personafy_core::transformation::TransformationStatus;
use personafy_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `transformations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transformation {
    pub id: DbId,
    pub user_id: DbId,
    pub character_id: DbId,
    /// The uploaded photo as a data URL.
    #[serde(skip_serializing)]
    pub original_image_url: String,
    /// One of `processing`, `completed`, `failed`.
    pub status: String,
    pub transformed_image_url: Option<String>,
    /// `true` when the stored result is the unmodified upload.
    pub is_fallback: bool,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub processing_time_ms: Option<i64>,
}

impl Transformation {
    /// Parse the status column. Rows are constrained by a CHECK, so an
    /// unknown value indicates schema drift.
    pub fn status(&self) -> Result<TransformationStatus, personafy_core::error::CoreError> {
        self.status.parse()
    }
}

/// DTO for creating a transformation. Status is always `processing`.
#[derive(Debug, Clone)]
pub struct CreateTransformation {
    pub user_id: DbId,
    pub character_id: DbId,
    pub original_image_url: String,
}

/// DTO for the single `processing -> completed` update.
#[derive(Debug, Clone)]
pub struct CompleteTransformation {
    pub transformed_image_url: String,
    pub is_fallback: bool,
    pub completed_at: Timestamp,
    pub processing_time_ms: i64,
}
