//! Prompt Builder (spec §4.6).
//!
//! A pure function: no network, no I/O. Grounded on the teacher's
//! `crates/shared/src/llm.rs` `build_chat_messages` (assembling a prompt
//! from typed inputs with no side effects).

use std::collections::HashMap;

const FALLBACK_BENCHMARKS: &str = "(no benchmark data available)";

const FORBIDDEN_CONSTRUCTS: &[&str] = &[
    "shell execution (System.cmd, std::process::Command, os.system)",
    "dynamic code evaluation (Code.eval_string, eval!)",
    "raw process spawning outside the documented concurrency primitives",
    "raw socket or filesystem access outside the evolvable namespace",
    "reflective runtime access (apply/*, binary-to-term decoding)",
];

/// Render a benchmark map as one `key: value` line per metric. `None`
/// represents "non-map input" in a dynamically-typed original and renders
/// the fixed fallback string; an empty map renders the empty string (spec
/// §4.6, §8 boundary cases).
#[must_use]
pub fn format_benchmarks(benchmarks: Option<&HashMap<String, f64>>) -> String {
    match benchmarks {
        None => FALLBACK_BENCHMARKS.to_string(),
        Some(map) if map.is_empty() => String::new(),
        Some(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.into_iter()
                .map(|k| format!("{k}: {}", map[k]))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Build the text blob sent to the LLM: target identifier, current source,
/// a readable benchmark rendering, the forbidden-construct list, and the
/// response-format contract (spec §4.6).
#[must_use]
pub fn build(target_name: &str, current_source: &str, benchmarks: &HashMap<String, f64>) -> String {
    let forbidden = FORBIDDEN_CONSTRUCTS
        .iter()
        .map(|c| format!("- {c}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are rewriting the evolvable target `{target_name}`.\n\n\
         Current source:\n```\n{current_source}\n```\n\n\
         Latest benchmarks:\n{benchmarks}\n\n\
         The following constructs are forbidden in your rewrite:\n{forbidden}\n\n\
         Respond with exactly one fenced code block containing the complete new \
         source for `{target_name}`, followed by a single line beginning with \
         `Reasoning:` explaining your change.",
        benchmarks = format_benchmarks(Some(benchmarks)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_benchmarks_empty_map_is_empty_string() {
        assert_eq!(format_benchmarks(Some(&HashMap::new())), "");
    }

    #[test]
    fn format_benchmarks_none_is_fallback() {
        assert_eq!(format_benchmarks(None), FALLBACK_BENCHMARKS);
    }

    #[test]
    fn format_benchmarks_renders_sorted_lines() {
        let mut m = HashMap::new();
        m.insert("b".to_string(), 2.0);
        m.insert("a".to_string(), 1.0);
        assert_eq!(format_benchmarks(Some(&m)), "a: 1\nb: 2");
    }

    #[test]
    fn build_is_pure_and_deterministic() {
        let benches = HashMap::from([("execution_time_us".to_string(), 42.0)]);
        let p1 = build("prompt_builder", "fn x() {}", &benches);
        let p2 = build("prompt_builder", "fn x() {}", &benches);
        assert_eq!(p1, p2);
        assert!(p1.contains("prompt_builder"));
        assert!(p1.contains("fn x() {}"));
        assert!(p1.contains("Reasoning:"));
    }
}
