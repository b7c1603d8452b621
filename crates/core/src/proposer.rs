//! Proposer (spec §4.7).
//!
//! Calls the LLM, parses the response, attributes token usage. Never
//! mutates disk. Grounded on the teacher's `shared/src/llm.rs`
//! `parse_chat_think_result` (parse-response-into-typed-result) and
//! `handlers/llm.rs` request flow, adapted to the injected `ChatClient`
//! trait instead of a concrete reqwest call.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use evo_shared::{ChatClient, ChatRequest, EvoError, Proposal, Target};

use crate::budget::TokenBudget;
use crate::router::ModelRouter;

/// Bounded receive timeout for the LLM call (spec §5: "fixed receive
/// timeout (60 s)").
const LLM_TIMEOUT: Duration = Duration::from_secs(60);

pub struct Proposer {
    client: Arc<dyn ChatClient>,
    budget: TokenBudget,
    router: ModelRouter,
    max_tokens: u32,
}

impl Proposer {
    #[must_use]
    pub fn new(
        client: Arc<dyn ChatClient>,
        budget: TokenBudget,
        router: ModelRouter,
        max_tokens: u32,
    ) -> Self {
        Self {
            client,
            budget,
            router,
            max_tokens,
        }
    }

    /// Execute the 8-step flow of spec §4.7.
    pub async fn propose(
        &self,
        target: &Target,
        benchmarks: &HashMap<String, f64>,
    ) -> Result<Proposal, EvoError> {
        // 1. Read the on-disk source for the target.
        let old_source = std::fs::read_to_string(&target.source_path).map_err(|e| {
            EvoError::ReadFailed {
                path: target.source_path.clone(),
                why: e.to_string(),
            }
        })?;

        // 2. Budget gate — the LLM is never called without budget.
        if !self.budget.has_budget().await {
            return Err(EvoError::BudgetExhausted);
        }

        // 3. Current model.
        let model = self.router.current().await;

        // 4. Build prompt.
        let prompt = crate::prompt::build(&target.name, &old_source, benchmarks);

        // 5. Call the LLM with a bounded timeout.
        let request = ChatRequest {
            model: model.clone(),
            max_tokens: self.max_tokens,
            prompt,
        };
        let response = tokio::time::timeout(LLM_TIMEOUT, self.client.complete(request))
            .await
            .map_err(|_| EvoError::RequestFailed("LLM call timed out".to_string()))??;

        // 6. Parse response: fenced code block + trailing Reasoning: line.
        let (new_source, reasoning) = evo_shared::llm::extract_code_and_reasoning(&response.text);
        let new_source = new_source.ok_or(EvoError::NoCodeInResponse)?;

        // 7. Record usage with the Token Budget.
        self.budget.record(response.tokens_in, response.tokens_out).await;

        // 8. Return the Proposal.
        Ok(Proposal {
            target: target.clone(),
            old_source,
            new_source,
            reasoning,
            model_tag: model,
            tokens_in: response.tokens_in,
            tokens_out: response.tokens_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use evo_shared::ChatResponse;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    struct StubClient {
        response_text: String,
        called: AtomicBool,
    }

    #[async_trait]
    impl ChatClient for StubClient {
        async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse, EvoError> {
            self.called.store(true, Ordering::SeqCst);
            Ok(ChatResponse {
                text: self.response_text.clone(),
                tokens_in: 10,
                tokens_out: 20,
            })
        }
    }

    fn write_target_source(dir: &tempfile::TempDir, name: &str, source: &str) -> Target {
        let path = dir.path().join(format!("{name}.rs"));
        std::fs::write(&path, source).unwrap();
        Target {
            name: name.to_string(),
            source_path: path.to_string_lossy().to_string(),
            test_path: String::new(),
        }
    }

    #[tokio::test]
    async fn budget_exhausted_never_calls_llm() {
        let dir = tempfile::tempdir().unwrap();
        let target = write_target_source(&dir, "t", "fn f() {}");
        let client = Arc::new(StubClient {
            response_text: "```\nfn f() {}\n```\nReasoning: noop".to_string(),
            called: AtomicBool::new(false),
        });
        let budget = TokenBudget::spawn(0, Arc::new(Notify::new()));
        let router = ModelRouter::spawn(3, "cheap".into(), "capable".into());
        let proposer = Proposer::new(client.clone(), budget, router, 4096);

        let err = proposer.propose(&target, &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, EvoError::BudgetExhausted));
        assert!(!client.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn missing_code_block_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let target = write_target_source(&dir, "t", "fn f() {}");
        let client = Arc::new(StubClient {
            response_text: "no code here".to_string(),
            called: AtomicBool::new(false),
        });
        let budget = TokenBudget::spawn(1000, Arc::new(Notify::new()));
        let router = ModelRouter::spawn(3, "cheap".into(), "capable".into());
        let proposer = Proposer::new(client, budget, router, 4096);

        let err = proposer.propose(&target, &HashMap::new()).await.unwrap_err();
        assert!(matches!(err, EvoError::NoCodeInResponse));
    }

    #[tokio::test]
    async fn successful_proposal_records_usage() {
        let dir = tempfile::tempdir().unwrap();
        let target = write_target_source(&dir, "t", "fn f() {}");
        let client = Arc::new(StubClient {
            response_text: "```\nfn g() {}\n```\nReasoning: renamed".to_string(),
            called: AtomicBool::new(false),
        });
        let budget = TokenBudget::spawn(1000, Arc::new(Notify::new()));
        let router = ModelRouter::spawn(3, "cheap".into(), "capable".into());
        let proposer = Proposer::new(client, budget.clone(), router, 4096);

        let proposal = proposer.propose(&target, &HashMap::new()).await.unwrap();
        assert_eq!(proposal.new_source, "fn g() {}\n");
        assert_eq!(proposal.reasoning, "renamed");
        assert_eq!(proposal.old_source, "fn f() {}");

        let status = budget.status().await;
        assert_eq!(status.tokens_used_today, 30);
    }
}
