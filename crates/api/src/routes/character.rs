//! Route definitions for the character catalogue.
//!
//! ```text
//! GET    /           -> list
//! GET    /{id}       -> get_by_id
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::character;
use crate::state::AppState;

/// Routes mounted at `/characters`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(character::list))
        .route("/{id}", get(character::get_by_id))
}
