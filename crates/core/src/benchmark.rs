//! Benchmarker (spec §4.4).
//!
//! For each target there is a hardcoded representative call: a small
//! snippet of source invoking the target's public surface with canned
//! arguments. The snippet is appended to whatever is *currently on disk*
//! at the target's source path and compiled fresh via `toolchain.rs` —
//! the same "recompile from disk, run as a child process" mechanism Gate
//! 4/5 use — so a benchmark taken after `Applier::apply` genuinely
//! exercises the just-applied candidate rather than the host's own
//! statically-linked copy of the algorithm (spec §9: "the Applier's
//! contract — after apply, subsequent calls observe new_source semantics
//! — is language-neutral; the mechanism is not").
//!
//! Timing invokes the compiled binary's internal loop of 100 iterations
//! and reads back the mean microseconds it reports; "memory" substitutes
//! for the GC-backed measurement spec.md describes (Rust has no tracked
//! heap/GC) by sampling the child's own resident-set size before/after one
//! extra invocation, forced in-process since the child is already an
//! isolated address space. Errors are captured and returned, never
//! raised — grounded on the teacher's `benches/helpers` harness style,
//! turned from a criterion bench into a runtime-invocable component.

use evo_shared::{
    BenchmarkSnapshot, EvoError, Target, METRIC_CODE_SIZE_LINES, METRIC_EXECUTION_TIME_US,
    METRIC_MEMORY_BYTES,
};
use std::collections::HashMap;

use crate::toolchain;

const ITERATIONS: u32 = 100;

#[derive(Debug, Clone, Default)]
pub struct Benchmarker;

impl Benchmarker {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run the representative workload for `target` against whatever
    /// source is currently on disk, producing a `BenchmarkSnapshot`, or a
    /// captured error (never a panic).
    pub fn run(&self, target: &Target) -> Result<BenchmarkSnapshot, EvoError> {
        let source = std::fs::read_to_string(&target.source_path).map_err(|e| EvoError::ReadFailed {
            path: target.source_path.clone(),
            why: e.to_string(),
        })?;
        let code_size_lines = count_lines_str(&source);

        let call = representative_call(&target.name)?;
        let combined = format!("{source}\n{call}\n{HARNESS}");
        let (_build, run) = toolchain::compile_and_run_bin(&combined, false)?;

        if !run.status.success() {
            return Err(EvoError::Internal(format!(
                "benchmark harness exited non-zero for '{}': {}",
                target.name,
                String::from_utf8_lossy(&run.stderr)
            )));
        }

        let stdout = String::from_utf8_lossy(&run.stdout);
        let elapsed_us = parse_metric(&stdout, "EVO_TIME_US")?;
        let memory_bytes = parse_metric(&stdout, "EVO_MEM_BYTES")?;

        let mut metrics = HashMap::new();
        metrics.insert(METRIC_EXECUTION_TIME_US.to_string(), elapsed_us);
        metrics.insert(METRIC_MEMORY_BYTES.to_string(), memory_bytes);
        metrics.insert(METRIC_CODE_SIZE_LINES.to_string(), code_size_lines as f64);

        Ok(BenchmarkSnapshot::new(metrics))
    }
}

fn parse_metric(stdout: &str, key: &str) -> Result<f64, EvoError> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(key).and_then(|rest| rest.strip_prefix('=')))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .ok_or_else(|| EvoError::Internal(format!("benchmark harness did not report {key}")))
}

/// The hardcoded canned-argument call for one target's public surface,
/// compiled alongside the on-disk source. Must keep calling the same
/// function signatures a rewrite is expected to preserve (Gate 5 already
/// requires this: the target's existing test file is recompiled against
/// the candidate unmodified).
fn representative_call(target_name: &str) -> Result<&'static str, EvoError> {
    match target_name {
        "prompt_builder" => Ok(r#"
fn __evo_representative_call() {
    use std::collections::HashMap;
    let mut benches: HashMap<String, f64> = HashMap::new();
    benches.insert("execution_time_us".to_string(), 123.0);
    let out = build("prompt_builder", "pub fn build() -> String { String::new() }", &benches);
    std::hint::black_box(out);
}
"#),
        "fitness" => Ok(r#"
fn __evo_representative_call() {
    use std::collections::HashMap;
    let mut before: HashMap<String, f64> = HashMap::new();
    before.insert("execution_time_us".to_string(), 100.0);
    let mut after: HashMap<String, f64> = HashMap::new();
    after.insert("execution_time_us".to_string(), 90.0);
    let v = verdict(&before, &after);
    std::hint::black_box(v);
}
"#),
        "benchmark" => Ok(r#"
fn __evo_representative_call() {
    let lines = count_lines("fn a() {}\nfn b() {}\n");
    let mean = mean_micros(&[100, 200, 300]);
    std::hint::black_box((lines, mean));
}
"#),
        "registry" => Ok(r#"
fn __evo_representative_call() {
    let idx = select(7, 4);
    std::hint::black_box(idx);
}
"#),
        other => Err(EvoError::Internal(format!(
            "no representative call registered for target '{other}'"
        ))),
    }
}

/// Appended to every compiled snapshot binary: runs the representative
/// call 100 times for timing, then once more with an RSS sample either
/// side for the memory delta, and prints both as `KEY=value` lines Gate
/// parsing reads back from the child's stdout.
const HARNESS: &str = r#"
fn main() {
    let iterations: u32 = 100;
    let mut elapsed_total = std::time::Duration::ZERO;
    for _ in 0..iterations {
        let start = std::time::Instant::now();
        __evo_representative_call();
        elapsed_total += start.elapsed();
    }
    let time_us = elapsed_total.as_secs_f64() * 1_000_000.0 / iterations as f64;

    let mem_before = __evo_rss_bytes();
    __evo_representative_call();
    let mem_after = __evo_rss_bytes();
    let mem_delta = mem_after.saturating_sub(mem_before);

    println!("EVO_TIME_US={time_us}");
    println!("EVO_MEM_BYTES={mem_delta}");
}

#[cfg(target_os = "linux")]
fn __evo_rss_bytes() -> u64 {
    let Ok(statm) = std::fs::read_to_string("/proc/self/statm") else {
        return 0;
    };
    statm
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .map(|pages| pages * 4096)
        .unwrap_or(0)
}

#[cfg(not(target_os = "linux"))]
fn __evo_rss_bytes() -> u64 {
    0
}
"#;

fn count_lines_str(s: &str) -> usize {
    s.lines().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_target_is_a_captured_error_not_a_panic() {
        let err = representative_call("nonexistent").unwrap_err();
        assert!(matches!(err, EvoError::Internal(_)));
    }

    #[test]
    fn count_lines_matches_newline_count() {
        assert_eq!(count_lines_str("a\nb\nc\n"), 3);
        assert_eq!(count_lines_str(""), 0);
    }

    #[test]
    fn parse_metric_reads_key_value_line() {
        let stdout = "EVO_TIME_US=12.5\nEVO_MEM_BYTES=4096\n";
        assert_eq!(parse_metric(stdout, "EVO_TIME_US").unwrap(), 12.5);
        assert_eq!(parse_metric(stdout, "EVO_MEM_BYTES").unwrap(), 4096.0);
    }

    #[test]
    fn parse_metric_missing_key_is_an_error() {
        assert!(parse_metric("no metrics here", "EVO_TIME_US").is_err());
    }

    /// Actually compiles and runs the real `registry` target's on-disk
    /// source under `evolvable/`, confirming a benchmark genuinely
    /// exercises whatever is on disk rather than the host's own compiled
    /// copy of the algorithm (this is the point of the whole component).
    #[test]
    fn run_compiles_and_executes_the_on_disk_source() {
        let dir = tempfile::tempdir().unwrap();
        let src_dir = dir.path().join("src");
        std::fs::create_dir_all(&src_dir).unwrap();
        let source_path = src_dir.join("registry.rs");
        std::fs::write(
            &source_path,
            "pub fn select(generation: u64, target_count: usize) -> usize {\n    \
             if target_count == 0 { return 0; }\n    (generation as usize) % target_count\n}\n",
        )
        .unwrap();

        let target = Target {
            name: "registry".to_string(),
            source_path: source_path.to_string_lossy().to_string(),
            test_path: String::new(),
        };

        let snapshot = Benchmarker::new().run(&target).unwrap();
        assert!(snapshot.get(METRIC_EXECUTION_TIME_US).unwrap() >= 0.0);
        assert_eq!(snapshot.get(METRIC_CODE_SIZE_LINES).unwrap(), 4.0);
    }
}
