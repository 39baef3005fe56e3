//! Handlers for chapter content payloads (page image lists).

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use mangaledger_core::address::ContentAddress;

use crate::error::{AppError, AppResult};
use crate::query::CompareParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /contents/{address}/images
// ---------------------------------------------------------------------------

/// List a chapter's images sorted by page.
pub async fn list_images(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<impl IntoResponse> {
    let address = ContentAddress::parse(&address)?;
    let images = state.walker.fetcher().fetch_images(Some(&address)).await;
    Ok(Json(DataResponse { data: images }))
}

// ---------------------------------------------------------------------------
// GET /contents/{address}/pages
// ---------------------------------------------------------------------------

/// List a chapter's images renumbered for the reader.
pub async fn list_reader_pages(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> AppResult<impl IntoResponse> {
    let address = ContentAddress::parse(&address)?;
    let pages = state
        .walker
        .fetcher()
        .fetch_reader_pages(Some(&address))
        .await;
    Ok(Json(DataResponse { data: pages }))
}

// ---------------------------------------------------------------------------
// GET /contents/compare?old=&new=
// ---------------------------------------------------------------------------

/// Compare two versions of a chapter's image list.
pub async fn compare_contents(
    State(state): State<AppState>,
    Query(params): Query<CompareParams>,
) -> AppResult<impl IntoResponse> {
    let old = ContentAddress::parse_optional(&params.old)?;
    let new = ContentAddress::parse_optional(&params.new)?;

    if old.is_none() && new.is_none() {
        return Err(AppError::BadRequest(
            "At least one of `old` or `new` is required".to_string(),
        ));
    }

    let result = state
        .walker
        .compare_contents(old.as_ref(), new.as_ref())
        .await;

    tracing::debug!(
        added = result.comparison.added.len(),
        removed = result.comparison.removed.len(),
        "Compared chapter contents"
    );

    Ok(Json(DataResponse { data: result }))
}
