//! Handlers for the `/characters` resource.

use axum::extract::{Path, State};
use axum::Json;
use personafy_core::error::CoreError;
use personafy_core::types::DbId;
use personafy_db::models::character::Character;
use personafy_db::repositories::CharacterRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/characters
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Character>>>> {
    let characters = CharacterRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: characters }))
}

/// GET /api/v1/characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Character>>> {
    let character = CharacterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Character",
            id: id.to_string(),
        }))?;
    Ok(Json(DataResponse { data: character }))
}
