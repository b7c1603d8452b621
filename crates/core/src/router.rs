//! Model Router actor (spec §4.3).
//!
//! Same actor shape as `budget.rs`: an owner task behind an `mpsc` mailbox.
//! State transitions (escalate on repeated failure, de-escalate on success)
//! are grounded on the teacher's `evolution/engine.rs` trigger/threshold
//! pattern (named constants gating state transitions).

use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use evo_shared::{ModelTier, RouterStatus};

struct State {
    current: ModelTier,
    consecutive_failures: u32,
    cheap_calls: u64,
    capable_calls: u64,
    escalations: u64,
    escalation_threshold: u32,
    cheap_tag: String,
    capable_tag: String,
}

impl State {
    fn bump_call_counter(&mut self) {
        match self.current {
            ModelTier::Cheap => self.cheap_calls += 1,
            ModelTier::Capable => self.capable_calls += 1,
        }
    }

    /// Increments the counter for the model that was *just used*, then
    /// resets failures and de-escalates (spec §4.3: "Every `report_*`
    /// increments the call counter for the currently selected model...
    /// Switching happens after the increment").
    fn report_success(&mut self) {
        self.bump_call_counter();
        self.consecutive_failures = 0;
        if self.current == ModelTier::Capable {
            info!("model router de-escalating to cheap after success");
        }
        self.current = ModelTier::Cheap;
    }

    fn report_failure(&mut self) {
        self.bump_call_counter();
        self.consecutive_failures += 1;
        if self.current == ModelTier::Cheap && self.consecutive_failures >= self.escalation_threshold
        {
            self.current = ModelTier::Capable;
            self.escalations += 1;
            warn!(
                consecutive_failures = self.consecutive_failures,
                "model router escalating to capable"
            );
        }
    }

    fn status(&self) -> RouterStatus {
        RouterStatus {
            current_model: self.current,
            current_model_tag: self.current.tag(&self.cheap_tag, &self.capable_tag).to_string(),
            consecutive_failures: self.consecutive_failures,
            cheap_calls: self.cheap_calls,
            capable_calls: self.capable_calls,
            escalations: self.escalations,
        }
    }
}

enum Msg {
    Current(oneshot::Sender<String>),
    ReportSuccess(oneshot::Sender<()>),
    ReportFailure(oneshot::Sender<()>),
    Status(oneshot::Sender<RouterStatus>),
}

#[derive(Clone)]
pub struct ModelRouter {
    tx: mpsc::Sender<Msg>,
}

impl ModelRouter {
    #[must_use]
    pub fn spawn(escalation_threshold: u32, cheap_tag: String, capable_tag: String) -> Self {
        let (tx, mut rx) = mpsc::channel::<Msg>(64);
        tokio::spawn(async move {
            let mut state = State {
                current: ModelTier::Cheap,
                consecutive_failures: 0,
                cheap_calls: 0,
                capable_calls: 0,
                escalations: 0,
                escalation_threshold,
                cheap_tag,
                capable_tag,
            };
            while let Some(msg) = rx.recv().await {
                match msg {
                    Msg::Current(reply) => {
                        let tag = state
                            .current
                            .tag(&state.cheap_tag, &state.capable_tag)
                            .to_string();
                        let _ = reply.send(tag);
                    }
                    Msg::ReportSuccess(reply) => {
                        state.report_success();
                        let _ = reply.send(());
                    }
                    Msg::ReportFailure(reply) => {
                        state.report_failure();
                        let _ = reply.send(());
                    }
                    Msg::Status(reply) => {
                        let _ = reply.send(state.status());
                    }
                }
            }
        });
        Self { tx }
    }

    /// The model identifier the Proposer should use for its next call.
    pub async fn current(&self) -> String {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Msg::Current(tx)).await;
        rx.await.unwrap_or_default()
    }

    pub async fn report_success(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Msg::ReportSuccess(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }

    pub async fn report_failure(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Msg::ReportFailure(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }

    pub async fn status(&self) -> RouterStatus {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Msg::Status(tx)).await;
        rx.await.unwrap_or(RouterStatus {
            current_model: ModelTier::Cheap,
            current_model_tag: String::new(),
            consecutive_failures: 0,
            cheap_calls: 0,
            capable_calls: 0,
            escalations: 0,
        })
    }
}
