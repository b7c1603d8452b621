//! Fitness Evaluator (spec §4.5).
//!
//! `score = 0.6·r(time) + 0.3·r(memory) + 0.1·r(lines)`, `r(m) = (before[m] −
//! after[m]) / before[m]` when `before[m] > 0`, else `0`; missing keys
//! contribute `0`. Verdict thresholds are `±0.05`; `neutral` always reports
//! `score = 0.0` exactly (spec §4.5, §8 invariants 2–3), preserving the
//! threshold semantics even when the underlying weighted score is a tiny
//! non-zero value.
//!
//! Pure functions — grounded on the teacher's `evolution/types.rs`
//! `FitnessWeights`/`FitnessScores` (weighted linear combination over named
//! axes, `validate()`-style finite checks) with range validation dropped
//! since these functions never receive untrusted weights, only metrics.

use evo_shared::{
    BenchmarkSnapshot, FitnessVerdict, METRIC_CODE_SIZE_LINES, METRIC_EXECUTION_TIME_US,
    METRIC_MEMORY_BYTES,
};

const WEIGHT_TIME: f64 = 0.6;
const WEIGHT_MEMORY: f64 = 0.3;
const WEIGHT_LINES: f64 = 0.1;
const THRESHOLD: f64 = 0.05;

/// Relative improvement of `metric`, comparing `before` to `after`.
/// `0.0` when the key is missing or `before[metric] <= 0`.
fn relative_improvement(before: &BenchmarkSnapshot, after: &BenchmarkSnapshot, metric: &str) -> f64 {
    let Some(b) = before.get(metric) else {
        return 0.0;
    };
    if b <= 0.0 {
        return 0.0;
    }
    let a = after.get(metric).unwrap_or(b);
    (b - a) / b
}

/// The weighted, signed score: positive means `after` is better than
/// `before`.
#[must_use]
pub fn score(before: &BenchmarkSnapshot, after: &BenchmarkSnapshot) -> f64 {
    WEIGHT_TIME * relative_improvement(before, after, METRIC_EXECUTION_TIME_US)
        + WEIGHT_MEMORY * relative_improvement(before, after, METRIC_MEMORY_BYTES)
        + WEIGHT_LINES * relative_improvement(before, after, METRIC_CODE_SIZE_LINES)
}

/// Classify two snapshots into a verdict (spec §3, §4.5).
#[must_use]
pub fn evaluate(before: &BenchmarkSnapshot, after: &BenchmarkSnapshot) -> FitnessVerdict {
    let s = score(before, after);
    if s.abs() <= THRESHOLD {
        FitnessVerdict::Neutral(0.0)
    } else if s > THRESHOLD {
        FitnessVerdict::Improved(s)
    } else {
        FitnessVerdict::Regressed(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn snapshot(time: f64, memory: f64, lines: f64) -> BenchmarkSnapshot {
        let mut m = HashMap::new();
        m.insert(METRIC_EXECUTION_TIME_US.to_string(), time);
        m.insert(METRIC_MEMORY_BYTES.to_string(), memory);
        m.insert(METRIC_CODE_SIZE_LINES.to_string(), lines);
        BenchmarkSnapshot::new(m)
    }

    #[test]
    fn identical_snapshots_score_zero_exactly() {
        let s = snapshot(100.0, 1000.0, 50.0);
        assert_eq!(score(&s, &s), 0.0);
    }

    #[test]
    fn empty_snapshots_score_zero() {
        let empty = BenchmarkSnapshot::empty();
        assert_eq!(score(&empty, &empty), 0.0);
    }

    #[test]
    fn zero_before_contributes_zero_not_division_error() {
        let before = snapshot(0.0, 1000.0, 50.0);
        let after = snapshot(50.0, 500.0, 25.0);
        // time metric's `before` is 0 -> contributes 0 regardless of `after`.
        let s = score(&before, &after);
        let expected = WEIGHT_MEMORY * 0.5 + WEIGHT_LINES * 0.5;
        assert!((s - expected).abs() < 1e-9);
    }

    #[test]
    fn verdict_is_neutral_iff_within_threshold() {
        let before = snapshot(100.0, 1000.0, 50.0);

        // time improves by 5% -> score = 0.6*0.05 = 0.03 (neutral)
        let after_small = snapshot(95.0, 1000.0, 50.0);
        assert!(matches!(evaluate(&before, &after_small), FitnessVerdict::Neutral(0.0)));

        // time improves 20% -> score = 0.6*0.2 = 0.12 (improved)
        let after_big = snapshot(80.0, 1000.0, 50.0);
        match evaluate(&before, &after_big) {
            FitnessVerdict::Improved(s) => assert!((s - 0.12).abs() < 1e-9),
            other => panic!("expected Improved, got {other:?}"),
        }

        // time worsens 100% (doubles) -> score = 0.6*(-1.0) = -0.6 (regressed)
        let after_worse = snapshot(200.0, 1000.0, 50.0);
        match evaluate(&before, &after_worse) {
            FitnessVerdict::Regressed(s) => assert!((s + 0.6).abs() < 1e-9),
            other => panic!("expected Regressed, got {other:?}"),
        }
    }

    #[test]
    fn s1_scenario_accept_path_score() {
        // S1: execution_time_us 100 -> 80, memory/lines unchanged.
        let before = snapshot(100.0, 1000.0, 50.0);
        let after = snapshot(80.0, 1000.0, 50.0);
        let s = score(&before, &after);
        assert!((s - 0.12).abs() < 1e-9);
        assert!(matches!(evaluate(&before, &after), FitnessVerdict::Improved(_)));
    }

    #[test]
    fn s4_scenario_regression_score() {
        let before = snapshot(100.0, 1000.0, 50.0);
        let after = snapshot(200.0, 1000.0, 50.0);
        let s = score(&before, &after);
        assert!((s + 0.6).abs() < 1e-9);
        assert!(matches!(evaluate(&before, &after), FitnessVerdict::Regressed(_)));
    }

    proptest::proptest! {
        #[test]
        fn neutral_iff_within_threshold_prop(
            bt in 1.0f64..1e6, at in 0.0f64..1e6,
            bm in 1.0f64..1e9, am in 0.0f64..1e9,
            bl in 1.0f64..1e5, al in 0.0f64..1e5,
        ) {
            let before = snapshot(bt, bm, bl);
            let after = snapshot(at, am, al);
            let s = score(&before, &after);
            let verdict = evaluate(&before, &after);
            let is_neutral = matches!(verdict, FitnessVerdict::Neutral(_));
            prop_assert_eq!(is_neutral, s.abs() <= THRESHOLD);
            if is_neutral {
                prop_assert_eq!(verdict.score(), 0.0);
            }
        }
    }
}
