//! Evolver: the orchestrating actor that runs one generation per cycle
//! (spec §4.11).
//!
//! Same actor shape as `budget.rs`/`router.rs`: an owner task behind an
//! `mpsc` mailbox, `tokio::select!`-ing a periodic tick against inbound
//! commands and a shared shutdown `Notify`. The cycle body is the one
//! place all the other components are wired together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Notify};
use tracing::{error, info, warn};

use evo_shared::{EvoError, GenerationRecord, GenerationStatus, GenerationStore, VcsCheckpoint};

use crate::applier::Applier;
use crate::benchmark::Benchmarker;
use crate::fitness;
use crate::historian::Historian;
use crate::proposer::Proposer;
use crate::registry::EvolvableRegistry;
use crate::router::ModelRouter;
use crate::validator::Validator;
use evo_shared::EvolverStatus;

enum Msg {
    RunOnce(oneshot::Sender<GenerationStatus>),
    Pause(oneshot::Sender<()>),
    Resume(oneshot::Sender<()>),
    Status(oneshot::Sender<EvolverStatus>),
}

struct State {
    generation: u64,
    running: bool,
    interval_ms: u64,
    accepted_total: u64,
    rejected_total: u64,
    last_result: Option<GenerationStatus>,
}

impl State {
    fn status(&self) -> EvolverStatus {
        let total = self.accepted_total + self.rejected_total;
        let accept_rate = if total == 0 {
            0.0
        } else {
            self.accepted_total as f64 / total as f64
        };
        EvolverStatus {
            generation: self.generation,
            running: self.running,
            interval_ms: self.interval_ms,
            accepted_total: self.accepted_total,
            rejected_total: self.rejected_total,
            accept_rate,
            last_result: self.last_result,
        }
    }

    fn record_result(&mut self, status: GenerationStatus) {
        if status.is_accepted() {
            self.accepted_total += 1;
        } else {
            self.rejected_total += 1;
        }
        self.last_result = Some(status);
        self.generation += 1;
    }
}

/// Everything one cycle needs. Held by the owner task, never shared
/// directly with clients.
struct Cycle {
    registry: EvolvableRegistry,
    benchmarker: Benchmarker,
    proposer: Proposer,
    validator: Validator,
    applier: Applier,
    historian: Historian,
    router: ModelRouter,
}

impl Cycle {
    /// Run exactly one generation. Always returns a `GenerationStatus` —
    /// every path through the cycle, including early errors, produces a
    /// persisted record and increments the generation counter exactly once
    /// (spec §4.11, §8 invariant: "the generation counter advances by
    /// exactly one per cycle regardless of outcome").
    async fn run_once(&self, generation: u64) -> GenerationStatus {
        let target = self.registry.select(generation);

        let before = match self.benchmarker.run(&target) {
            Ok(snap) => snap,
            Err(e) => return self.finish_error(generation, &target.name, e).await,
        };

        let proposal = match self.proposer.propose(&target, &before.metrics).await {
            Ok(p) => p,
            Err(EvoError::BudgetExhausted) => {
                info!(generation, target = %target.name, "skipping cycle: budget exhausted");
                return self.finish_error(generation, &target.name, EvoError::BudgetExhausted).await;
            }
            Err(e) => {
                self.router.report_failure().await;
                return self.finish_error(generation, &target.name, e).await;
            }
        };

        if let Err(e) = self
            .validator
            .validate(&proposal.old_source, &proposal.new_source, &target.test_path)
        {
            self.router.report_failure().await;
            return self
                .finish(generation, &proposal, GenerationStatus::RejectedValidation, 0.0, &e.to_string())
                .await;
        }

        // An Applier failure here is an operational error, not a validation
        // rejection — the candidate already passed all five gates, so
        // `rejected_validation` would misrepresent why the generation
        // didn't land (spec §7: Apply-kind errors are a distinct group from
        // Validation-kind errors; §3 has no `rejected_apply` status, so this
        // falls back to the catch-all `error` the same way Benchmarker/
        // Proposer failures do).
        if let Err(e) = self.applier.apply(&target.name, &proposal.new_source) {
            self.router.report_failure().await;
            return self
                .finish(generation, &proposal, GenerationStatus::Error, 0.0, &e.to_string())
                .await;
        }

        let after = match self.benchmarker.run(&target) {
            Ok(snap) => snap,
            Err(e) => {
                // Roll back: the write succeeded but we can't measure it.
                let _ = self.applier.rollback(&target.name, &proposal.old_source);
                self.router.report_failure().await;
                return self
                    .finish(generation, &proposal, GenerationStatus::Error, 0.0, &e.to_string())
                    .await;
            }
        };

        let verdict = fitness::evaluate(&before, &after);
        let (status, score) = match verdict {
            evo_shared::FitnessVerdict::Improved(s) => (GenerationStatus::Accepted, s),
            evo_shared::FitnessVerdict::Neutral(s) => (GenerationStatus::AcceptedNeutral, s),
            evo_shared::FitnessVerdict::Regressed(s) => (GenerationStatus::RejectedRegression, s),
        };

        if status == GenerationStatus::RejectedRegression {
            if let Err(e) = self.applier.rollback(&target.name, &proposal.old_source) {
                error!(generation, target = %target.name, error = %e, "rollback after regression failed");
            }
            self.router.report_failure().await;
        } else {
            self.router.report_success().await;
        }

        self.finish(generation, &proposal, status, score, &proposal.reasoning).await
    }

    async fn finish(
        &self,
        generation: u64,
        proposal: &evo_shared::Proposal,
        status: GenerationStatus,
        score: f64,
        reasoning: &str,
    ) -> GenerationStatus {
        let record = GenerationRecord {
            generation_number: generation,
            target_name: proposal.target.name.clone(),
            status,
            fitness_score: score,
            model_tag: proposal.model_tag.clone(),
            tokens_in: proposal.tokens_in,
            tokens_out: proposal.tokens_out,
            reasoning: reasoning.to_string(),
            old_source: proposal.old_source.clone(),
            new_source: proposal.new_source.clone(),
            created_at: chrono::Utc::now(),
        };
        if let Err(e) = self.historian.record(record).await {
            error!(generation, error = %e, "failed to persist generation record");
        }
        status
    }

    async fn finish_error(&self, generation: u64, target_name: &str, err: EvoError) -> GenerationStatus {
        warn!(generation, target = %target_name, error = %err, "generation cycle errored");
        let record = GenerationRecord {
            generation_number: generation,
            target_name: target_name.to_string(),
            status: GenerationStatus::Error,
            fitness_score: 0.0,
            model_tag: String::new(),
            tokens_in: 0,
            tokens_out: 0,
            reasoning: err.to_string(),
            old_source: String::new(),
            new_source: String::new(),
            created_at: chrono::Utc::now(),
        };
        if let Err(e) = self.historian.record(record).await {
            error!(generation, error = %e, "failed to persist error record");
        }
        GenerationStatus::Error
    }
}

#[derive(Clone)]
pub struct Evolver {
    tx: mpsc::Sender<Msg>,
}

#[allow(clippy::too_many_arguments)]
impl Evolver {
    #[must_use]
    pub fn spawn(
        interval: Duration,
        registry: EvolvableRegistry,
        benchmarker: Benchmarker,
        proposer: Proposer,
        validator: Validator,
        applier: Applier,
        store: Arc<dyn GenerationStore>,
        vcs: Arc<dyn VcsCheckpoint>,
        router: ModelRouter,
        shutdown: Arc<Notify>,
        start_running: bool,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<Msg>(16);
        let cycle = Cycle {
            registry,
            benchmarker,
            proposer,
            validator,
            applier,
            historian: Historian::new(store, vcs),
            router,
        };
        tokio::spawn(async move {
            let mut state = State {
                generation: 0,
                running: start_running,
                interval_ms: interval.as_millis() as u64,
                accepted_total: 0,
                rejected_total: 0,
                last_result: None,
            };
            let mut tick = tokio::time::interval(interval);
            info!(interval_ms = state.interval_ms, "evolver started");
            loop {
                tokio::select! {
                    () = shutdown.notified() => {
                        info!("evolver shutting down");
                        break;
                    }
                    _ = tick.tick() => {
                        if state.running {
                            let status = cycle.run_once(state.generation).await;
                            state.record_result(status);
                        }
                    }
                    msg = rx.recv() => {
                        match msg {
                            Some(Msg::RunOnce(reply)) => {
                                let status = cycle.run_once(state.generation).await;
                                state.record_result(status);
                                let _ = reply.send(status);
                            }
                            Some(Msg::Pause(reply)) => {
                                state.running = false;
                                let _ = reply.send(());
                            }
                            Some(Msg::Resume(reply)) => {
                                state.running = true;
                                let _ = reply.send(());
                            }
                            Some(Msg::Status(reply)) => {
                                let _ = reply.send(state.status());
                            }
                            None => break,
                        }
                    }
                }
            }
        });
        Self { tx }
    }

    /// Force one cycle immediately, regardless of the `running` flag and
    /// without waiting for the next tick.
    pub async fn run_once(&self) -> GenerationStatus {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Msg::RunOnce(tx)).await;
        rx.await.unwrap_or(GenerationStatus::Error)
    }

    pub async fn pause(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Msg::Pause(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }

    pub async fn resume(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Msg::Resume(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }

    pub async fn status(&self) -> EvolverStatus {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Msg::Status(tx)).await;
        rx.await.unwrap_or(EvolverStatus {
            generation: 0,
            running: false,
            interval_ms: 0,
            accepted_total: 0,
            rejected_total: 0,
            accept_rate: 0.0,
            last_result: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_result_advances_generation_exactly_once() {
        let mut state = State {
            generation: 5,
            running: true,
            interval_ms: 1000,
            accepted_total: 0,
            rejected_total: 0,
            last_result: None,
        };
        state.record_result(GenerationStatus::RejectedValidation);
        assert_eq!(state.generation, 6);
        assert_eq!(state.rejected_total, 1);
        assert_eq!(state.accepted_total, 0);
    }

    #[test]
    fn accept_rate_counts_both_accepted_flavors() {
        let mut state = State {
            generation: 0,
            running: true,
            interval_ms: 1000,
            accepted_total: 0,
            rejected_total: 0,
            last_result: None,
        };
        state.record_result(GenerationStatus::Accepted);
        state.record_result(GenerationStatus::AcceptedNeutral);
        state.record_result(GenerationStatus::RejectedRegression);
        let status = state.status();
        assert_eq!(status.accepted_total, 2);
        assert_eq!(status.rejected_total, 1);
        assert!((status.accept_rate - 2.0 / 3.0).abs() < 1e-9);
    }
}
