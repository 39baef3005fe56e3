//! Handlers for entity-level history lookups through the anchor event log.
//!
//! These are the only endpoints that depend on the event log; when it is
//! unreachable they fail with 502 instead of degrading.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use mangaledger_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /entities/{id}/latest
// ---------------------------------------------------------------------------

/// Fetch the newest anchored record of an entity.
pub async fn get_latest(
    State(state): State<AppState>,
    Path(entity_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = state
        .walker
        .get_latest_version_by_entity_id(entity_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No history available for entity {entity_id}")))?;

    Ok(Json(DataResponse { data: record }))
}

// ---------------------------------------------------------------------------
// GET /entities/{id}/anchors
// ---------------------------------------------------------------------------

/// List anchor events of an entity, newest first.
pub async fn list_anchors(
    State(state): State<AppState>,
    Path(entity_id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .walker
        .get_paginated_anchor_events(entity_id, params.page, params.limit)
        .await?;

    tracing::debug!(entity_id, page = page.page, total = page.total, "Listed anchor events");

    Ok(Json(DataResponse { data: page }))
}

// ---------------------------------------------------------------------------
// GET /entities/{id}/versions
// ---------------------------------------------------------------------------

/// List anchor events of an entity together with their records.
pub async fn list_versions(
    State(state): State<AppState>,
    Path(entity_id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .walker
        .materialize_anchor_page(entity_id, params.page, params.limit)
        .await?;

    Ok(Json(DataResponse { data: page }))
}
