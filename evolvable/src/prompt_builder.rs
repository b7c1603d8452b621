// Evolvable surface: prompt formatting. Rewrites here must stay a single
// self-contained module over std only — no external crates, no process,
// filesystem, or network access (see the Validator's gate 2 allowlist).

use std::collections::HashMap;

pub fn format_benchmarks(benchmarks: &HashMap<String, f64>) -> String {
    if benchmarks.is_empty() {
        return String::new();
    }
    let mut keys: Vec<&String> = benchmarks.keys().collect();
    keys.sort();
    keys.iter()
        .map(|k| format!("{k}: {}", benchmarks[*k]))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build(target_name: &str, source: &str, benchmarks: &HashMap<String, f64>) -> String {
    let bench_block = format_benchmarks(benchmarks);
    format!(
        "Target: {target_name}\n\nCurrent source:\n{source}\n\nLatest benchmarks:\n{bench_block}\n\nRespond with exactly one fenced code block containing the new source, followed by a single line starting with \"Reasoning:\"."
    )
}
