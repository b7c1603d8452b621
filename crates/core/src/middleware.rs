//! Admin-key gate for mutating control-surface routes (spec §10.3,
//! §11). Grounded on the teacher's `handlers.rs::check_auth`: a plain
//! function called at the top of each mutating handler rather than a
//! tower layer, compared in constant time so response latency doesn't leak
//! key bytes.

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

use crate::{AppError, AppResult, AppState};

/// Reject the request unless `X-API-Key` matches the configured admin key.
/// When no admin key is configured, access is allowed only in debug builds
/// (spec §11: "an operator running locally without an admin key configured
/// gets a loud warning, not a silent bypass in release").
pub fn require_admin(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    match &state.config.admin_api_key {
        Some(required) => {
            let provided = headers.get("X-API-Key").and_then(|h| h.to_str().ok());
            let matches = match provided {
                Some(p) => bool::from(p.as_bytes().ct_eq(required.as_bytes())),
                None => false,
            };
            if matches {
                Ok(())
            } else {
                Err(AppError::Unauthorized)
            }
        }
        None if cfg!(debug_assertions) => {
            tracing::warn!("control surface mutating route allowed without an admin key (debug build)");
            Ok(())
        }
        None => Err(AppError::Unauthorized),
    }
}
