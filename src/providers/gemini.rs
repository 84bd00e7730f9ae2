use super::{build_prompt, request_explanation, AiProvider, ErrorContext, ProviderError, MAX_TOKENS, TEMPERATURE};
use crate::http_client::HttpClient;
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MODEL: &str = "gemini-1.5-flash-latest";

/// Google Gemini `generateContent`.
///
/// The API key travels in the query string, so the URL must never be logged.
pub struct GeminiProvider {
    api_key: String,
    http: Arc<dyn HttpClient>,
}

impl GeminiProvider {
    pub fn new(api_key: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            api_key: api_key.to_string(),
            http,
        }
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent?key={}", BASE_URL, MODEL, self.api_key)
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn explain_error(&self, context: &ErrorContext) -> Result<String, ProviderError> {
        let headers = [("Content-Type", "application/json")];
        let body = json!({
            "contents": [
                { "parts": [{ "text": build_prompt(context) }] }
            ],
            "generationConfig": {
                "maxOutputTokens": MAX_TOKENS,
                "temperature": TEMPERATURE
            }
        });

        request_explanation(
            self.http.as_ref(),
            self.name(),
            &self.url(),
            &headers,
            &body,
            "/candidates/0/content/parts/0/text",
        )
        .await
    }
}
