//! Wire-format helpers for the chat-completion transport (spec §6).
//!
//! Mirrors the teacher's `crates/shared/src/llm.rs` (`build_chat_request`,
//! `parse_chat_content`): pure functions, no network, shared by the
//! transport implementation and its tests. The wire shape here is the
//! Anthropic-style Messages API spec §6 specifies, not the OpenAI
//! chat-completions shape the teacher's plugins speak.

use crate::error::EvoError;
use crate::traits::ChatResponse;

/// Build the JSON body for `POST /v1/messages`:
/// `{model, max_tokens, messages: [{role: "user", content: <prompt>}]}`.
#[must_use]
pub fn build_request_body(model: &str, max_tokens: u32, prompt: &str) -> serde_json::Value {
    serde_json::json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": [{ "role": "user", "content": prompt }],
    })
}

/// Parse a `200` response body into a `ChatResponse`.
///
/// Expected shape: `{content: [{type: "text", text: <string>}, ...],
/// usage: {input_tokens, output_tokens}}`. Locates the first content block
/// of type `"text"`; token counts default to `0` when the `usage` field is
/// absent or malformed (spec §4.7 step 6).
pub fn parse_response_body(body: &str) -> Result<ChatResponse, EvoError> {
    let json: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| EvoError::RequestFailed(format!("malformed JSON response: {e}")))?;

    let text = json
        .get("content")
        .and_then(|c| c.as_array())
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        })
        .and_then(|b| b.get("text"))
        .and_then(|t| t.as_str())
        .ok_or(EvoError::NoCodeInResponse)?
        .to_string();

    let tokens_in = json
        .get("usage")
        .and_then(|u| u.get("input_tokens"))
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);
    let tokens_out = json
        .get("usage")
        .and_then(|u| u.get("output_tokens"))
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0);

    Ok(ChatResponse {
        text,
        tokens_in,
        tokens_out,
    })
}

/// Extract the first fenced code block (dotall, first match) from the LLM's
/// text response, and the trailing `Reasoning:` line (spec §4.7 step 6).
///
/// Returns `(new_source, reasoning)`. `new_source` is `None` when no fenced
/// block is present; callers map that to `EvoError::NoCodeInResponse`.
/// `reasoning` falls back to a fixed string when no `Reasoning:` line exists.
#[must_use]
pub fn extract_code_and_reasoning(text: &str) -> (Option<String>, String) {
    const FALLBACK_REASONING: &str = "(no reasoning provided)";

    let code = extract_fenced_block(text);

    let reasoning = text
        .lines()
        .find_map(|line| line.trim_start().strip_prefix("Reasoning:"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_REASONING.to_string());

    (code, reasoning)
}

fn extract_fenced_block(text: &str) -> Option<String> {
    let start_fence = text.find("```")?;
    let after_open = start_fence + 3;
    // Skip an optional language tag (e.g. ```rust) up to the next newline.
    let body_start = text[after_open..]
        .find('\n')
        .map(|i| after_open + i + 1)
        .unwrap_or(after_open);
    let end_fence = text[body_start..].find("```")? + body_start;
    Some(text[body_start..end_fence].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_fenced_block_and_reasoning() {
        let text = "Here you go:\n```rust\nfn f() {}\n```\nReasoning: it is simpler\n";
        let (code, reasoning) = extract_code_and_reasoning(text);
        assert_eq!(code.as_deref(), Some("fn f() {}\n"));
        assert_eq!(reasoning, "it is simpler");
    }

    #[test]
    fn missing_reasoning_falls_back() {
        let text = "```\nfn f() {}\n```\n";
        let (code, reasoning) = extract_code_and_reasoning(text);
        assert_eq!(code.as_deref(), Some("fn f() {}\n"));
        assert_eq!(reasoning, "(no reasoning provided)");
    }

    #[test]
    fn missing_code_block_is_none() {
        let (code, _) = extract_code_and_reasoning("no fences here");
        assert!(code.is_none());
    }

    #[test]
    fn parses_response_body_with_defaults() {
        let body = serde_json::json!({
            "content": [{"type": "text", "text": "hello"}],
        })
        .to_string();
        let resp = parse_response_body(&body).unwrap();
        assert_eq!(resp.text, "hello");
        assert_eq!(resp.tokens_in, 0);
        assert_eq!(resp.tokens_out, 0);
    }
}
