//! Handlers for history records addressed by content address.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use mangaledger_core::address::ContentAddress;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /records/{address}
// ---------------------------------------------------------------------------

/// Fetch a single history record.
pub async fn get_record(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<impl IntoResponse> {
    let address = ContentAddress::parse(&address)?;

    let record = state
        .walker
        .get_by_address(&address)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No history record available at {address}")))?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// GET /records/{address}/history
// ---------------------------------------------------------------------------

/// Reconstruct the full history ending at a record, newest first.
///
/// An unavailable start yields an empty list rather than an error.
pub async fn get_record_history(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<impl IntoResponse> {
    let address = ContentAddress::parse(&address)?;

    let history = state.walker.walk_full_history(Some(&address)).await;

    tracing::debug!(%address, count = history.len(), "Reconstructed history");

    Ok(Json(DataResponse { data: history }))
}
