//! `evo_core`: the self-modification engine.
//!
//! Wires the process-wide actors (Token Budget, Model Router, Evolver)
//! behind an axum control surface, the way the teacher's `lib.rs` wires its
//! `AppState`. Grounded on the teacher's top-level `lib.rs` module layout.

pub mod applier;
pub mod benchmark;
pub mod budget;
pub mod config;
pub mod db;
pub mod evolver;
pub mod fitness;
pub mod handlers;
pub mod historian;
pub mod llm;
pub mod middleware;
pub mod prompt;
pub mod proposer;
pub mod registry;
pub mod router;
pub mod toolchain;
pub mod validator;
pub mod vcs;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::Notify;
use tracing::info;

use evo_shared::{EvoError, GenerationStore};

use crate::budget::TokenBudget;
use crate::config::AppConfig;
use crate::evolver::Evolver;
use crate::router::ModelRouter;

/// Shared state handed to every axum handler. Holds only cloneable actor
/// handles and injected capability trait objects, never raw mutable state
/// (spec §1, §6: the core never names a concrete HTTP client, SQL engine,
/// or `git` binary — those live behind `evo_shared`'s traits).
pub struct AppState {
    pub config: AppConfig,
    pub budget: TokenBudget,
    pub router: ModelRouter,
    pub evolver: Evolver,
    pub store: Arc<dyn GenerationStore>,
    pub shutdown: Arc<Notify>,
}

#[derive(Debug)]
pub enum AppError {
    Evo(EvoError),
    Validation(String),
    NotFound(String),
    Unauthorized,
}

impl From<EvoError> for AppError {
    fn from(e: EvoError) -> Self {
        Self::Evo(e)
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Evo(e) => {
                let status = if e.is_validation() {
                    StatusCode::UNPROCESSABLE_ENTITY
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, serde_json::json!({ "error": e.kind(), "message": e.to_string() }))
            }
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": "validation", "message": msg }),
            ),
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": "not_found", "message": msg }),
            ),
            Self::Unauthorized => (
                StatusCode::FORBIDDEN,
                serde_json::json!({ "error": "unauthorized", "message": "invalid or missing admin key" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Assemble the axum router exactly once at startup (spec §11: control
/// surface routes).
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let cors = tower_http::cors::CorsLayer::new()
        .allow_origin(state.config.cors_origins.clone())
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static("x-api-key"),
        ]);

    Router::new()
        .route("/healthz", get(handlers::system::health))
        .route("/api/status", get(handlers::system::status))
        .route("/api/budget", get(handlers::system::budget))
        .route("/api/router", get(handlers::system::router_status))
        .route("/api/generations", get(handlers::generations::recent))
        .route("/api/generations/:n", get(handlers::generations::get_one))
        .route("/api/generations/by-status/:status", get(handlers::generations::by_status))
        .route("/api/control/pause", post(handlers::control::pause))
        .route("/api/control/resume", post(handlers::control::resume))
        .route("/api/control/run-once", post(handlers::control::run_once))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP control surface and block until shutdown is notified
/// (spec §11: graceful shutdown via `Notify`, mirroring the teacher's
/// `managers/scheduler.rs` shutdown wiring).
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.bind_address, state.config.port);
    let shutdown = state.shutdown.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "evo control surface listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown.notified().await;
            info!("control surface shutting down");
        })
        .await?;
    Ok(())
}

const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const LLM_MAX_TOKENS: u32 = 4096;

/// Wire the injected capabilities (LLM transport, persistence store, VCS
/// checkpoint) to the core actors and serve the control surface until
/// shutdown. The single entry point both the `evo_system` binary and the
/// Tauri desktop dashboard embed in-process, mirroring the teacher's own
/// `run_kernel` (its bin crate and its `dashboard/src-tauri` both call
/// `cloto_core::run_kernel()` rather than duplicating the bootstrap).
pub async fn run_kernel() -> anyhow::Result<()> {
    use std::time::Duration;
    use tokio::sync::Notify;
    use tracing::error;

    use crate::applier::Applier;
    use crate::benchmark::Benchmarker;
    use crate::db::SqliteGenerationStore;
    use crate::evolver::Evolver;
    use crate::llm::AnthropicChatClient;
    use crate::proposer::Proposer;
    use crate::registry::EvolvableRegistry;
    use crate::vcs::GitCheckpoint;

    let config = AppConfig::load()?;
    info!(port = config.port, "evo starting up");

    let shutdown = Arc::new(Notify::new());

    let store: Arc<dyn evo_shared::GenerationStore> =
        Arc::new(SqliteGenerationStore::connect(&config.database_url).await?);
    let vcs: Arc<dyn evo_shared::VcsCheckpoint> =
        Arc::new(GitCheckpoint::new(".", config.evolvable_root.clone()));
    let chat: Arc<dyn evo_shared::ChatClient> = Arc::new(AnthropicChatClient::new(
        ANTHROPIC_ENDPOINT,
        config.anthropic_api_key.clone(),
    )?);

    let budget = TokenBudget::spawn(config.daily_budget, shutdown.clone());
    let router_handle = ModelRouter::spawn(
        config.escalation_threshold,
        config.cheap_model_tag.clone(),
        config.capable_model_tag.clone(),
    );

    let registry = EvolvableRegistry::new(config.evolvable_root.clone());
    let benchmarker = Benchmarker::new();
    let proposer = Proposer::new(chat, budget.clone(), router_handle.clone(), LLM_MAX_TOKENS);
    let validator = crate::validator::Validator::new();
    let applier = Applier::new(config.evolvable_root.clone());

    let evolver = Evolver::spawn(
        Duration::from_millis(config.interval_ms),
        registry,
        benchmarker,
        proposer,
        validator,
        applier,
        store.clone(),
        vcs,
        router_handle.clone(),
        shutdown.clone(),
        config.auto_start,
    );

    let state = Arc::new(AppState {
        config,
        budget,
        router: router_handle,
        evolver,
        store,
        shutdown: shutdown.clone(),
    });

    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("received ctrl-c, shutting down");
        shutdown.notify_waiters();
    };

    tokio::select! {
        result = serve(state) => {
            if let Err(e) = result {
                error!(error = %e, "control surface exited with an error");
                return Err(e);
            }
        }
        () = ctrl_c => {}
    }

    Ok(())
}
