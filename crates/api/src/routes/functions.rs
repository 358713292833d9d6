//! Edge-function compatible routes, mounted at `/functions/v1`.
//!
//! Existing web clients call `POST /functions/v1/transform-image`; it runs
//! the same handler as `POST /api/v1/transformations`.

use axum::routing::post;
use axum::Router;

use crate::handlers::transformation;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/transform-image", post(transformation::create))
}
