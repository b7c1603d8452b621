//! Tagged error kinds for every gate of the evolution pipeline.
//!
//! Mirrors the teacher's `ExivError`: a single `thiserror` enum, serde-tagged
//! so it survives the axum JSON boundary and the persistence layer intact.
//! Nothing in this crate panics or throws across a component boundary —
//! every fallible call returns `Result<_, EvoError>`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum EvoError {
    // ── Input / read ──
    #[error("failed to read {path}: {why}")]
    ReadFailed { path: String, why: String },

    // ── Budget ──
    #[error("daily token budget exhausted")]
    BudgetExhausted,

    // ── Transport ──
    #[error("ANTHROPIC_API_KEY is not configured")]
    MissingApiKey,
    #[error("request to LLM endpoint failed: {0}")]
    RequestFailed(String),
    #[error("LLM endpoint returned {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("no fenced code block found in LLM response")]
    NoCodeInResponse,

    // ── Validation ──
    #[error("changed {changed} lines, cap is {cap}")]
    TooManyChanges { changed: usize, cap: usize },
    #[error("candidate source failed to parse")]
    AstParseFailed,
    #[error("unsafe code: {0:?}")]
    UnsafeCode(Vec<String>),
    #[error("{0} top-level side-effecting form(s) in candidate module")]
    ModuleLevelSideEffects(usize),
    #[error("candidate source does not define a single module")]
    NotAModule,
    #[error("compilation failed: {0}")]
    CompilationFailed(String),
    #[error("tests failed:\n{0}")]
    TestsFailed(String),
    #[error("failed to execute test process")]
    TestExecutionFailed,

    // ── Apply ──
    #[error("target {0} is not in the writable whitelist")]
    ModuleNotInWhitelist(String),
    #[error("path traversal blocked: {0}")]
    PathTraversalBlocked(String),
    #[error("failed to write {path}: {why}")]
    WriteFailed { path: String, why: String },
    #[error("failed to reload target: {0}")]
    ReloadFailed(String),

    // ── History ──
    #[error("git add failed: {0}")]
    GitAddFailed(String),
    #[error("git commit failed: {0}")]
    GitCommitFailed(String),
    #[error("persistence error: {0}")]
    Persistence(String),

    // ── Misc ──
    #[error("{0}")]
    Internal(String),
}

impl EvoError {
    /// Short machine-readable tag, used for logging and for the
    /// `Generation.status` mapping in the Evolver.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ReadFailed { .. } => "read_failed",
            Self::BudgetExhausted => "budget_exhausted",
            Self::MissingApiKey => "missing_api_key",
            Self::RequestFailed(_) => "request_failed",
            Self::ApiError { .. } => "api_error",
            Self::NoCodeInResponse => "no_code_in_response",
            Self::TooManyChanges { .. } => "too_many_changes",
            Self::AstParseFailed => "ast_parse_failed",
            Self::UnsafeCode(_) => "unsafe_code",
            Self::ModuleLevelSideEffects(_) => "module_level_side_effects",
            Self::NotAModule => "not_a_module",
            Self::CompilationFailed(_) => "compilation_failed",
            Self::TestsFailed(_) => "tests_failed",
            Self::TestExecutionFailed => "test_execution_failed",
            Self::ModuleNotInWhitelist(_) => "module_not_in_whitelist",
            Self::PathTraversalBlocked(_) => "path_traversal_blocked",
            Self::WriteFailed { .. } => "write_failed",
            Self::ReloadFailed(_) => "reload_failed",
            Self::GitAddFailed(_) => "git_add_failed",
            Self::GitCommitFailed(_) => "git_commit_failed",
            Self::Persistence(_) => "persistence_error",
            Self::Internal(_) => "internal",
        }
    }

    /// True for the three kinds the Validator's Gate 2 produces; used by the
    /// Evolver to decide whether a validation failure belongs under
    /// `unsafe_code` when aggregating multiple Gate-2 violations.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TooManyChanges { .. }
                | Self::AstParseFailed
                | Self::UnsafeCode(_)
                | Self::ModuleLevelSideEffects(_)
                | Self::NotAModule
                | Self::CompilationFailed(_)
                | Self::TestsFailed(_)
                | Self::TestExecutionFailed
        )
    }
}
