//! Data-store seam for the transform pipeline.

use async_trait::async_trait;
use personafy_core::types::{DbId, Timestamp};
use personafy_db::models::character::Character;
use personafy_db::models::transformation::{
    CompleteTransformation, CreateTransformation, Transformation,
};
use personafy_db::repositories::{CharacterRepo, TransformationRepo, UserStatsRepo};
use personafy_db::DbPool;

use crate::error::StoreError;

/// Everything the pipeline reads from or writes to persistent storage.
#[async_trait]
pub trait TransformStore: Send + Sync {
    async fn find_character(&self, id: DbId) -> Result<Option<Character>, StoreError>;

    /// Insert a record in `processing` state.
    async fn create_transformation(
        &self,
        input: &CreateTransformation,
    ) -> Result<Transformation, StoreError>;

    /// `processing -> completed`.
    async fn complete_transformation(
        &self,
        id: DbId,
        input: &CompleteTransformation,
    ) -> Result<(), StoreError>;

    /// `processing -> failed`.
    async fn fail_transformation(&self, id: DbId, completed_at: Timestamp)
        -> Result<(), StoreError>;

    /// Atomic per-user counter increment.
    async fn increment_user_transformations(&self, user_id: DbId) -> Result<(), StoreError>;
}

/// [`TransformStore`] backed by the PostgreSQL repositories.
#[derive(Clone)]
pub struct PgTransformStore {
    pool: DbPool,
}

impl PgTransformStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransformStore for PgTransformStore {
    async fn find_character(&self, id: DbId) -> Result<Option<Character>, StoreError> {
        Ok(CharacterRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_transformation(
        &self,
        input: &CreateTransformation,
    ) -> Result<Transformation, StoreError> {
        Ok(TransformationRepo::create(&self.pool, input).await?)
    }

    async fn complete_transformation(
        &self,
        id: DbId,
        input: &CompleteTransformation,
    ) -> Result<(), StoreError> {
        TransformationRepo::complete(&self.pool, id, input)
            .await?
            .map(|_| ())
            .ok_or(StoreError::NotProcessing(id))
    }

    async fn fail_transformation(
        &self,
        id: DbId,
        completed_at: Timestamp,
    ) -> Result<(), StoreError> {
        if TransformationRepo::mark_failed(&self.pool, id, completed_at).await? {
            Ok(())
        } else {
            Err(StoreError::NotProcessing(id))
        }
    }

    async fn increment_user_transformations(&self, user_id: DbId) -> Result<(), StoreError> {
        let total = UserStatsRepo::increment_transformations(&self.pool, user_id).await?;
        tracing::debug!(%user_id, total, "User transformation count incremented");
        Ok(())
    }
}
