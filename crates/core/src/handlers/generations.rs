//! Generation history endpoints, read-only (spec §11, §4.10).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::{AppError, AppResult, AppState};

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

/// `GET /api/generations?limit=` — most recent generations first.
pub async fn recent(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = query.limit.unwrap_or(50).min(500);
    let records = state.store.recent(limit).await?;
    Ok(Json(serde_json::to_value(records).unwrap_or_default()))
}

/// `GET /api/generations/:n` — a single generation record.
pub async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(n): Path<u64>,
) -> AppResult<Json<serde_json::Value>> {
    match state.store.get(n).await? {
        Some(record) => Ok(Json(serde_json::to_value(record).unwrap_or_default())),
        None => Err(AppError::NotFound(format!("generation {n} not found"))),
    }
}

/// `GET /api/generations/by-status/:status?limit=` — filtered by status
/// (SPEC_FULL §11: a secondary query the teacher's own history endpoints
/// always expose alongside "most recent").
pub async fn by_status(
    State(state): State<Arc<AppState>>,
    Path(status): Path<String>,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<serde_json::Value>> {
    let limit = query.limit.unwrap_or(50).min(500);
    let records = state.store.by_status(&status, limit).await?;
    Ok(Json(serde_json::to_value(records).unwrap_or_default()))
}
