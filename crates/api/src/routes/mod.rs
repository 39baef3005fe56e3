pub mod contents;
pub mod entities;
pub mod health;
pub mod records;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /records/{address}                    single history record
/// /records/{address}/history            full chain, newest first
///
/// /contents/{address}/images            chapter images sorted by page
/// /contents/{address}/pages             reader pages, renumbered from 1
/// /contents/compare                     diff two versions (?old=&new=)
///
/// /entities/{id}/latest                 newest anchored record
/// /entities/{id}/anchors                anchor events (?page=&limit=)
/// /entities/{id}/versions               anchor events with records (?page=&limit=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/records", records::router())
        .nest("/contents", contents::router())
        .nest("/entities", entities::router())
}
