//! Injected-capability contracts for the three external collaborators
//! spec.md §1/§6 places out of scope of the core: the LLM transport, the
//! generation-record persistence store, and the version-control checkpoint.
//!
//! Grounded on the teacher's `PluginDataStore`/`NetworkCapability` traits:
//! narrow `async_trait` interfaces held behind `Arc<dyn _>`, so `evo_core`
//! never names a concrete HTTP client, SQL engine, or `git` binary.

use crate::error::EvoError;
use crate::model::GenerationRecord;
use async_trait::async_trait;

/// A single chat-completion request, shaped per spec §6.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub prompt: String,
}

/// A single chat-completion response, shaped per spec §6:
/// `{content: [{type: "text", text}], usage: {input_tokens, output_tokens}}`.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub text: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

/// The LLM transport: HTTP to a chat-completion endpoint (spec §1, §6).
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, EvoError>;
}

/// The persistence store for generation records (spec §1, §6): "any
/// relational engine" — this trait is the narrow interface the core speaks.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn insert(&self, record: GenerationRecord) -> Result<(), EvoError>;
    async fn get(&self, generation_number: u64) -> Result<Option<GenerationRecord>, EvoError>;
    async fn latest_generation_number(&self) -> Result<Option<u64>, EvoError>;
    async fn recent(&self, limit: usize) -> Result<Vec<GenerationRecord>, EvoError>;
    async fn by_status(&self, status: &str, limit: usize) -> Result<Vec<GenerationRecord>, EvoError>;
}

/// The version-control side-effect that timestamps each accepted change
/// (spec §1, §4.10, §6): "stage the evolvable directory, then commit with
/// an allow-empty flag".
#[async_trait]
pub trait VcsCheckpoint: Send + Sync {
    async fn checkpoint(&self, message: &str) -> Result<(), EvoError>;
}
