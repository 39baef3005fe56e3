//! Route definitions for the `/contents` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::contents;
use crate::state::AppState;

/// Routes mounted at `/contents`.
///
/// ```text
/// GET /compare              -> compare_contents (?old=&new=)
/// GET /{address}/images     -> list_images
/// GET /{address}/pages      -> list_reader_pages
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/compare", get(contents::compare_contents))
        .route("/{address}/images", get(contents::list_images))
        .route("/{address}/pages", get(contents::list_reader_pages))
}
