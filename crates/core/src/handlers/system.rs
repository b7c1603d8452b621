//! Read-only system endpoints: liveness, Evolver/Budget/Router status
//! (spec §11). Grounded on the teacher's `handlers.rs::health_handler` /
//! `get_metrics` (no-auth, read-only GETs).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::AppState;

/// `GET /healthz` — liveness probe, no auth (spec §11).
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /api/status` — Evolver orchestrator snapshot.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let status = state.evolver.status().await;
    Json(serde_json::to_value(status).unwrap_or_default())
}

/// `GET /api/budget` — Token Budget singleton snapshot.
pub async fn budget(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let status = state.budget.status().await;
    Json(serde_json::to_value(status).unwrap_or_default())
}

/// `GET /api/router` — Model Router singleton snapshot.
pub async fn router_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let status = state.router.status().await;
    Json(serde_json::to_value(status).unwrap_or_default())
}
