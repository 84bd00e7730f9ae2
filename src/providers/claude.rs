use super::{build_prompt, request_explanation, AiProvider, ErrorContext, ProviderError, MAX_TOKENS};
use crate::http_client::HttpClient;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
const MODEL: &str = "claude-3-haiku-20240307";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages API.
pub struct ClaudeProvider {
    api_key: String,
    http: Arc<dyn HttpClient>,
}

impl ClaudeProvider {
    pub fn new(api_key: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            api_key: api_key.to_string(),
            http,
        }
    }
}

#[async_trait]
impl AiProvider for ClaudeProvider {
    fn name(&self) -> &str {
        "claude"
    }

    async fn explain_error(&self, context: &ErrorContext) -> Result<String, ProviderError> {
        let headers = [
            ("x-api-key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
            ("anthropic-version", ANTHROPIC_VERSION),
        ];
        let body = json!({
            "model": MODEL,
            "max_tokens": MAX_TOKENS,
            "messages": [
                {
                    "role": "user",
                    "content": build_prompt(context)
                }
            ]
        });

        request_explanation(self.http.as_ref(), self.name(), ENDPOINT, &headers, &body, "/content/0/text").await
    }
}
