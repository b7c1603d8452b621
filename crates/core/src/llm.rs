//! reqwest-backed `ChatClient` (spec §6: the Anthropic-style Messages API).
//!
//! Grounded on the teacher's `crates/shared/src/llm.rs` HTTP call pattern
//! (client built once, `?`-propagated transport errors, explicit timeout)
//! adapted to the wire shape `evo_shared::llm` parses.

use std::time::Duration;

use async_trait::async_trait;
use evo_shared::{ChatClient, ChatRequest, ChatResponse, EvoError};

const RECEIVE_TIMEOUT: Duration = Duration::from_secs(60);

pub struct AnthropicChatClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl AnthropicChatClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, EvoError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(EvoError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .timeout(RECEIVE_TIMEOUT)
            .build()
            .map_err(|e| EvoError::RequestFailed(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl ChatClient for AnthropicChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, EvoError> {
        let body = evo_shared::llm::build_request_body(&request.model, request.max_tokens, &request.prompt);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| EvoError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| EvoError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(EvoError::ApiError {
                status: status.as_u16(),
                body: text,
            });
        }

        evo_shared::llm::parse_response_body(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_api_key() {
        let err = AnthropicChatClient::new("https://api.anthropic.com/v1/messages", "").unwrap_err();
        assert!(matches!(err, EvoError::MissingApiKey));
    }

    #[test]
    fn accepts_configured_key() {
        assert!(AnthropicChatClient::new("https://api.anthropic.com/v1/messages", "sk-test").is_ok());
    }
}
