//! Route definitions for transformations.
//!
//! ```text
//! POST   /           -> create       (create_router, no request timeout)
//! GET    /{id}       -> get_by_id    (router)
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::transformation;
use crate::state::AppState;

/// Lookup routes mounted at `/transformations`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(transformation::get_by_id))
}

/// The create route, mounted at `/transformations` outside the timeout layer.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/", post(transformation::create))
}
