//! Core data model: §3 of the specification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One evolvable unit. The set of targets is fixed and known at startup
/// (§4.1); this struct is the Registry's element type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub source_path: String,
    pub test_path: String,
}

/// An LLM-generated candidate replacement for a target's source.
/// Immutable once constructed (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub target: Target,
    pub old_source: String,
    pub new_source: String,
    pub reasoning: String,
    pub model_tag: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

/// Required benchmark metric keys (§3). Other keys may be present but these
/// three are load-bearing for Fitness Evaluator math.
pub const METRIC_EXECUTION_TIME_US: &str = "execution_time_us";
pub const METRIC_MEMORY_BYTES: &str = "memory_bytes";
pub const METRIC_CODE_SIZE_LINES: &str = "code_size_lines";

/// A mapping from metric name to numeric value, plus an observability-only
/// timestamp (§3: "not used in fitness math").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSnapshot {
    pub metrics: HashMap<String, f64>,
    pub captured_at: DateTime<Utc>,
}

impl BenchmarkSnapshot {
    #[must_use]
    pub fn new(metrics: HashMap<String, f64>) -> Self {
        Self {
            metrics,
            captured_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }
}

/// The Fitness Evaluator's classification of two snapshots (§3, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "score")]
pub enum FitnessVerdict {
    Improved(f64),
    Neutral(f64),
    Regressed(f64),
}

impl FitnessVerdict {
    #[must_use]
    pub fn score(&self) -> f64 {
        match self {
            Self::Improved(s) | Self::Neutral(s) | Self::Regressed(s) => *s,
        }
    }
}

/// Persisted generation outcome (§3). `generation_number` is unique;
/// `status` is drawn from this enumerated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Accepted,
    AcceptedNeutral,
    RejectedRegression,
    RejectedValidation,
    Error,
}

impl GenerationStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::AcceptedNeutral => "accepted_neutral",
            Self::RejectedRegression => "rejected_regression",
            Self::RejectedValidation => "rejected_validation",
            Self::Error => "error",
        }
    }

    /// True for statuses the Model Router should treat as a successful call
    /// (§4.11: "on accepted (either flavor) it receives `report_success`").
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted | Self::AcceptedNeutral)
    }
}

impl std::str::FromStr for GenerationStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accepted" => Ok(Self::Accepted),
            "accepted_neutral" => Ok(Self::AcceptedNeutral),
            "rejected_regression" => Ok(Self::RejectedRegression),
            "rejected_validation" => Ok(Self::RejectedValidation),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown generation status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation_number: u64,
    pub target_name: String,
    pub status: GenerationStatus,
    pub fitness_score: f64,
    pub model_tag: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
    pub reasoning: String,
    pub old_source: String,
    pub new_source: String,
    pub created_at: DateTime<Utc>,
}

/// Process-wide Token Budget singleton state (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub daily_cap: u64,
    pub tokens_used_today: u64,
    pub api_calls_today: u64,
    pub total_tokens_in: u64,
    pub total_tokens_out: u64,
    pub last_reset_date: chrono::NaiveDate,
    pub remaining: u64,
    pub percent_used: f64,
}

/// Process-wide Model Router singleton state (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    Cheap,
    Capable,
}

impl ModelTier {
    #[must_use]
    pub fn tag<'a>(&self, cheap_tag: &'a str, capable_tag: &'a str) -> &'a str {
        match self {
            Self::Cheap => cheap_tag,
            Self::Capable => capable_tag,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterStatus {
    pub current_model: ModelTier,
    pub current_model_tag: String,
    pub consecutive_failures: u32,
    pub cheap_calls: u64,
    pub capable_calls: u64,
    pub escalations: u64,
}

/// Evolver orchestrator state snapshot (§3, §4.11).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolverStatus {
    pub generation: u64,
    pub running: bool,
    pub interval_ms: u64,
    pub accepted_total: u64,
    pub rejected_total: u64,
    pub accept_rate: f64,
    pub last_result: Option<GenerationStatus>,
}
