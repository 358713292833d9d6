//! Handlers for the `/transformations` resource.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use personafy_core::error::CoreError;
use personafy_core::types::DbId;
use personafy_db::models::transformation::Transformation;
use personafy_db::repositories::TransformationRepo;
use personafy_pipeline::transform::{TransformOutcome, TransformRequest};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/transformations
/// POST /functions/v1/transform-image
///
/// Runs the transform pipeline. Responds 200 with the final image for both
/// generated and fallback outcomes; `fallback` tells them apart.
///
/// The pipeline runs on its own task so a dropped connection cannot cancel
/// it between record creation and the terminal update. A body that cannot be
/// read as the request shape is an unexpected error (500 with `details`).
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<TransformRequest>, JsonRejection>,
) -> AppResult<Json<TransformOutcome>> {
    let Json(input) = payload.map_err(|e| {
        tracing::warn!(error = %e, "Unreadable transform request body");
        AppError::Unexpected(e.body_text())
    })?;

    let pipeline = Arc::clone(&state.pipeline);
    let outcome = tokio::spawn(async move { pipeline.run(input).await })
        .await
        .map_err(|e| AppError::Unexpected(format!("Transform task failed: {e}")))??;
    Ok(Json(outcome))
}

/// GET /api/v1/transformations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Transformation>>> {
    let transformation = TransformationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Transformation",
            id: id.to_string(),
        }))?;
    Ok(Json(DataResponse { data: transformation }))
}
