//! Token Budget actor (spec §4.2).
//!
//! A process-wide singleton, structured the way the teacher structures its
//! long-lived background actors in `managers/scheduler.rs`: an owner task
//! draining a typed `mpsc` mailbox, `tokio::select!`-ing a timer against a
//! shared shutdown `Notify`. Clients hold only the `mpsc::Sender` (cloned
//! freely) and never see the mutable state directly.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::time::{self, Duration};
use tracing::{debug, info};

use evo_shared::BudgetStatus;

/// Hourly lazy-reset tick (spec §4.2: "A periodic tick (hourly) triggers the
/// lazy reset so dashboards stay fresh even without queries").
const TICK_INTERVAL: Duration = Duration::from_secs(3600);

enum Msg {
    HasBudget(oneshot::Sender<bool>),
    Record {
        tokens_in: u64,
        tokens_out: u64,
        reply: oneshot::Sender<()>,
    },
    Status(oneshot::Sender<BudgetStatus>),
    Reset(oneshot::Sender<()>),
}

struct State {
    daily_cap: u64,
    tokens_used_today: u64,
    api_calls_today: u64,
    total_tokens_in: u64,
    total_tokens_out: u64,
    last_reset_date: chrono::NaiveDate,
}

impl State {
    fn new(daily_cap: u64) -> Self {
        Self {
            daily_cap,
            tokens_used_today: 0,
            api_calls_today: 0,
            total_tokens_in: 0,
            total_tokens_out: 0,
            last_reset_date: chrono::Utc::now().date_naive(),
        }
    }

    /// Lazy midnight reset: applied before every read (spec §4.2, §8
    /// invariant: "`last_reset_date` equals today's UTC date or a call to
    /// the status query will reset it first").
    fn maybe_reset(&mut self) {
        let today = chrono::Utc::now().date_naive();
        if today != self.last_reset_date {
            debug!(from = %self.last_reset_date, to = %today, "token budget daily reset");
            self.tokens_used_today = 0;
            self.api_calls_today = 0;
            self.last_reset_date = today;
        }
    }

    fn has_budget(&mut self) -> bool {
        self.maybe_reset();
        self.tokens_used_today < self.daily_cap
    }

    fn record(&mut self, tokens_in: u64, tokens_out: u64) {
        self.maybe_reset();
        self.tokens_used_today += tokens_in + tokens_out;
        self.total_tokens_in += tokens_in;
        self.total_tokens_out += tokens_out;
        self.api_calls_today += 1;
    }

    fn status(&mut self) -> BudgetStatus {
        self.maybe_reset();
        let remaining = self.daily_cap.saturating_sub(self.tokens_used_today);
        let percent_used = if self.daily_cap == 0 {
            0.0
        } else {
            (self.tokens_used_today as f64 / self.daily_cap as f64 * 1000.0).round() / 10.0
        };
        BudgetStatus {
            daily_cap: self.daily_cap,
            tokens_used_today: self.tokens_used_today,
            api_calls_today: self.api_calls_today,
            total_tokens_in: self.total_tokens_in,
            total_tokens_out: self.total_tokens_out,
            last_reset_date: self.last_reset_date,
            remaining,
            percent_used,
        }
    }

    fn reset(&mut self) {
        self.tokens_used_today = 0;
        self.api_calls_today = 0;
        self.last_reset_date = chrono::Utc::now().date_naive();
    }
}

/// Handle clients use to talk to the Token Budget actor.
#[derive(Clone)]
pub struct TokenBudget {
    tx: mpsc::Sender<Msg>,
}

impl TokenBudget {
    /// Spawn the actor task and return a handle. `shutdown` is shared with
    /// the rest of the process; notifying it stops the hourly tick task.
    #[must_use]
    pub fn spawn(daily_cap: u64, shutdown: Arc<Notify>) -> Self {
        let (tx, mut rx) = mpsc::channel::<Msg>(64);
        tokio::spawn(async move {
            let mut state = State::new(daily_cap);
            let mut tick = time::interval(TICK_INTERVAL);
            info!(daily_cap, "token budget actor started");
            loop {
                tokio::select! {
                    () = shutdown.notified() => {
                        info!("token budget actor shutting down");
                        break;
                    }
                    _ = tick.tick() => {
                        state.maybe_reset();
                    }
                    msg = rx.recv() => {
                        match msg {
                            Some(Msg::HasBudget(reply)) => { let _ = reply.send(state.has_budget()); }
                            Some(Msg::Record { tokens_in, tokens_out, reply }) => {
                                state.record(tokens_in, tokens_out);
                                let _ = reply.send(());
                            }
                            Some(Msg::Status(reply)) => { let _ = reply.send(state.status()); }
                            Some(Msg::Reset(reply)) => { state.reset(); let _ = reply.send(()); }
                            None => break,
                        }
                    }
                }
            }
        });
        Self { tx }
    }

    pub async fn has_budget(&self) -> bool {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Msg::HasBudget(tx)).await.is_err() {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    pub async fn record(&self, tokens_in: u64, tokens_out: u64) {
        let (tx, rx) = oneshot::channel();
        if self
            .tx
            .send(Msg::Record {
                tokens_in,
                tokens_out,
                reply: tx,
            })
            .await
            .is_ok()
        {
            let _ = rx.await;
        }
    }

    pub async fn status(&self) -> BudgetStatus {
        let (tx, rx) = oneshot::channel();
        let _ = self.tx.send(Msg::Status(tx)).await;
        rx.await.unwrap_or_else(|_| BudgetStatus {
            daily_cap: 0,
            tokens_used_today: 0,
            api_calls_today: 0,
            total_tokens_in: 0,
            total_tokens_out: 0,
            last_reset_date: chrono::Utc::now().date_naive(),
            remaining: 0,
            percent_used: 0.0,
        })
    }

    pub async fn reset(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Msg::Reset(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(cap: u64) -> TokenBudget {
        TokenBudget::spawn(cap, Arc::new(Notify::new()))
    }

    #[tokio::test]
    async fn has_budget_false_iff_used_ge_cap() {
        let b = budget(100);
        assert!(b.has_budget().await);
        b.record(60, 40).await;
        assert!(!b.has_budget().await);
        let s = b.status().await;
        assert_eq!(s.tokens_used_today, 100);
        assert_eq!(s.remaining, 0);
    }

    #[tokio::test]
    async fn record_accumulates_totals_and_calls() {
        let b = budget(1000);
        b.record(10, 5).await;
        b.record(3, 2).await;
        let s = b.status().await;
        assert_eq!(s.tokens_used_today, 20);
        assert_eq!(s.total_tokens_in, 13);
        assert_eq!(s.total_tokens_out, 7);
        assert_eq!(s.api_calls_today, 2);
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let b = budget(100);
        b.record(99, 0).await;
        b.reset().await;
        let after_one = b.status().await;
        b.reset().await;
        let after_two = b.status().await;
        assert_eq!(after_one.tokens_used_today, after_two.tokens_used_today);
        assert_eq!(after_two.tokens_used_today, 0);
    }

    #[tokio::test]
    async fn percent_used_rounds_to_one_decimal() {
        let b = budget(3);
        b.record(1, 0).await;
        let s = b.status().await;
        assert!((s.percent_used - 33.3).abs() < 1e-9);
    }
}
