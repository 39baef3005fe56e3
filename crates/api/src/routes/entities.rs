//! Route definitions for the `/entities` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::entities;
use crate::state::AppState;

/// Routes mounted at `/entities`.
///
/// ```text
/// GET /{id}/latest          -> get_latest
/// GET /{id}/anchors         -> list_anchors (?page=&limit=)
/// GET /{id}/versions        -> list_versions (?page=&limit=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/latest", get(entities::get_latest))
        .route("/{id}/anchors", get(entities::list_anchors))
        .route("/{id}/versions", get(entities::list_versions))
}
