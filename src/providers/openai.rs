use super::{build_prompt, request_explanation, AiProvider, ErrorContext, ProviderError, MAX_TOKENS, TEMPERATURE};
use crate::http_client::HttpClient;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-3.5-turbo";

/// OpenAI chat completions.
pub struct OpenAiProvider {
    api_key: String,
    http: Arc<dyn HttpClient>,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            api_key: api_key.to_string(),
            http,
        }
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": MODEL,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE
        })
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn explain_error(&self, context: &ErrorContext) -> Result<String, ProviderError> {
        let authorization = format!("Bearer {}", self.api_key);
        let headers = [
            ("Authorization", authorization.as_str()),
            ("Content-Type", "application/json"),
        ];
        let body = self.request_body(&build_prompt(context));

        request_explanation(
            self.http.as_ref(),
            self.name(),
            ENDPOINT,
            &headers,
            &body,
            "/choices/0/message/content",
        )
        .await
    }
}
