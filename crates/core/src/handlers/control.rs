//! Mutating control-surface endpoints: pause/resume/run-once (spec §4.11,
//! §4.12, §11). Every handler here is gated by `middleware::require_admin`
//! before it touches the Evolver, the way the teacher's mutating routes
//! check `check_auth` first.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

use crate::middleware::require_admin;
use crate::{AppResult, AppState};

/// `POST /api/control/pause` — cancel the next scheduled tick (spec §4.11:
/// pause never interrupts an in-flight cycle).
pub async fn pause(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    require_admin(&state, &headers)?;
    state.evolver.pause().await;
    Ok(Json(serde_json::json!({ "paused": true })))
}

/// `POST /api/control/resume` — re-arm the periodic tick.
pub async fn resume(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    require_admin(&state, &headers)?;
    state.evolver.resume().await;
    Ok(Json(serde_json::json!({ "resumed": true })))
}

/// `POST /api/control/run-once` — force a synchronous cycle regardless of
/// `running` (spec §4.11). The dashboard layer is responsible for
/// rate-limiting this to one call per 30s (spec §4.12); the core itself
/// does not rate-limit so other callers (e.g. the CLI) are not penalized
/// by the dashboard's own cadence.
pub async fn run_once(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<serde_json::Value>> {
    require_admin(&state, &headers)?;
    let status = state.evolver.run_once().await;
    Ok(Json(serde_json::json!({ "result": status.as_str() })))
}
