//! Route definitions for the `/records` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::records;
use crate::state::AppState;

/// Routes mounted at `/records`.
///
/// ```text
/// GET /{address}            -> get_record
/// GET /{address}/history    -> get_record_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{address}", get(records::get_record))
        .route("/{address}/history", get(records::get_record_history))
}
