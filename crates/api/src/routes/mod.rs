pub mod character;
pub mod functions;
pub mod health;
pub mod transformation;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` read-only route tree.
///
/// Route hierarchy:
///
/// ```text
/// /characters                      list (ordered by name)
/// /characters/{id}                 get
///
/// /transformations/{id}            get stored record
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/characters", character::router())
        .nest("/transformations", transformation::router())
}

/// Routes that run the transform pipeline.
///
/// ```text
/// POST /functions/v1/transform-image
/// POST /api/v1/transformations
/// ```
///
/// A started transformation runs to completion, so these are never wrapped
/// in the request timeout.
pub fn transform_routes() -> Router<AppState> {
    Router::new()
        .nest("/functions/v1", functions::router())
        .nest("/api/v1/transformations", transformation::create_router())
}
