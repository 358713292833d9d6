//! Repository for the `transformations` table.
//!
//! Terminal updates are guarded by `status = 'processing'` so a record can
//! leave `processing` at most once, even if two writers race.

use personafy_core::transformation::TransformationStatus;
use personafy_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::transformation::{
    CompleteTransformation, CreateTransformation, Transformation,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, character_id, original_image_url, status, \
     transformed_image_url, is_fallback, created_at, completed_at, processing_time_ms";

/// Provides the create / complete / fail lifecycle for transformations.
pub struct TransformationRepo;

impl TransformationRepo {
    /// Insert a new `processing` transformation, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransformation,
    ) -> Result<Transformation, sqlx::Error> {
        let query = format!(
            "INSERT INTO transformations (user_id, character_id, original_image_url, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transformation>(&query)
            .bind(input.user_id)
            .bind(input.character_id)
            .bind(&input.original_image_url)
            .bind(TransformationStatus::Processing.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a transformation by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Transformation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM transformations WHERE id = $1");
        sqlx::query_as::<_, Transformation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Move a `processing` transformation to `completed` with its result.
    ///
    /// Returns `None` if no `processing` row with the given `id` exists.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        input: &CompleteTransformation,
    ) -> Result<Option<Transformation>, sqlx::Error> {
        let query = format!(
            "UPDATE transformations SET
                status = $2,
                transformed_image_url = $3,
                is_fallback = $4,
                completed_at = $5,
                processing_time_ms = $6
             WHERE id = $1 AND status = $7
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Transformation>(&query)
            .bind(id)
            .bind(TransformationStatus::Completed.as_str())
            .bind(&input.transformed_image_url)
            .bind(input.is_fallback)
            .bind(input.completed_at)
            .bind(input.processing_time_ms)
            .bind(TransformationStatus::Processing.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Move a `processing` transformation to `failed`.
    ///
    /// Returns `true` if a row was updated.
    pub async fn mark_failed(
        pool: &PgPool,
        id: DbId,
        completed_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transformations SET status = $2, completed_at = $3
             WHERE id = $1 AND status = $4",
        )
        .bind(id)
        .bind(TransformationStatus::Failed.as_str())
        .bind(completed_at)
        .bind(TransformationStatus::Processing.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
