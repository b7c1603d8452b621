// Evolvable surface: fitness scoring. Self-contained std-only mirror of
// the weighted comparator the orchestrator runs after every candidate is
// applied (see crates/core/src/fitness.rs for the live implementation this
// module is benchmarked and rewritten relative to).

use std::collections::HashMap;

const WEIGHT_TIME: f64 = 0.6;
const WEIGHT_MEMORY: f64 = 0.3;
const WEIGHT_LINES: f64 = 0.1;
const THRESHOLD: f64 = 0.05;

fn relative_improvement(before: &HashMap<String, f64>, after: &HashMap<String, f64>, metric: &str) -> f64 {
    let Some(&b) = before.get(metric) else {
        return 0.0;
    };
    if b <= 0.0 {
        return 0.0;
    }
    let a = *after.get(metric).unwrap_or(&b);
    (b - a) / b
}

pub fn score(before: &HashMap<String, f64>, after: &HashMap<String, f64>) -> f64 {
    WEIGHT_TIME * relative_improvement(before, after, "execution_time_us")
        + WEIGHT_MEMORY * relative_improvement(before, after, "memory_bytes")
        + WEIGHT_LINES * relative_improvement(before, after, "code_size_lines")
}

pub fn verdict(before: &HashMap<String, f64>, after: &HashMap<String, f64>) -> (&'static str, f64) {
    let s = score(before, after);
    if s.abs() <= THRESHOLD {
        ("neutral", 0.0)
    } else if s > THRESHOLD {
        ("improved", s)
    } else {
        ("regressed", s)
    }
}
