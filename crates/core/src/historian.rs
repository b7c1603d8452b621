//! Historian (spec §4.10).
//!
//! Persists a generation record and takes a version-control checkpoint.
//! Persistence happens first; the checkpoint is best-effort and its own
//! failure does not unwind the persisted record (spec §8, §12 open
//! question: "non-transactional by design — a lost checkpoint is
//! recoverable from the generation log, a lost generation log is not").
//! Grounded on the teacher's `vcs.rs` argument-sanitization before handing
//! strings to a child process.

use std::sync::Arc;

use chrono::Utc;
use evo_shared::{GenerationRecord, GenerationStatus, GenerationStore, VcsCheckpoint};
use tracing::warn;

/// Commit messages are truncated to this many characters (spec §4.10:
/// "truncate to 500 chars so a runaway reasoning string can't blow out a
/// commit message").
const MESSAGE_MAX_LEN: usize = 500;

pub struct Historian {
    store: Arc<dyn GenerationStore>,
    vcs: Arc<dyn VcsCheckpoint>,
}

impl Historian {
    #[must_use]
    pub fn new(store: Arc<dyn GenerationStore>, vcs: Arc<dyn VcsCheckpoint>) -> Self {
        Self { store, vcs }
    }

    /// Persist `record`, then checkpoint. Returns the persistence error if
    /// persistence itself failed; a checkpoint failure is logged and
    /// swallowed (spec §4.10: checkpoint failure never fails the cycle).
    pub async fn record(&self, record: GenerationRecord) -> Result<(), evo_shared::EvoError> {
        let generation_number = record.generation_number;
        let status = record.status;
        let reasoning = record.reasoning.clone();
        let target_name = record.target_name.clone();

        self.store.insert(record).await?;

        let message = checkpoint_message(generation_number, &target_name, status, &reasoning);
        if let Err(e) = self.vcs.checkpoint(&message).await {
            warn!(generation_number, error = %e, "checkpoint failed, generation record already persisted");
        }
        Ok(())
    }
}

/// Build the one-line checkpoint message: sanitized reasoning text bounded
/// to `MESSAGE_MAX_LEN` characters (spec §4.10).
fn checkpoint_message(generation: u64, target: &str, status: GenerationStatus, reasoning: &str) -> String {
    let sanitized = sanitize(reasoning);
    let prefix = format!("evo: generation {generation} ({target}, {}) ", status.as_str());
    let budget = MESSAGE_MAX_LEN.saturating_sub(prefix.len());
    let truncated: String = sanitized.chars().take(budget).collect();
    format!("{prefix}{truncated}")
}

/// Punctuation allowed through the filter, beyond alphanumerics and
/// whitespace (spec §4.10: "a short list of punctuation").
const SAFE_PUNCT: &[char] = &['.', ',', ':', '-', '_', '\'', '(', ')', '/'];

/// Allowlist-filter the reasoning text down to alphanumerics, whitespace,
/// and `SAFE_PUNCT`, then collapse newlines/runs of whitespace to a single
/// space (spec §4.10: "strips any character outside a safe set —
/// alphanumerics, whitespace, a short list of punctuation — collapses
/// newlines"). Everything else, including shell metacharacters like `$`,
/// backtick, `;`, `|`, `&`, is dropped rather than merely passed through.
fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || SAFE_PUNCT.contains(c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
