//! AI providers that turn a failed command into an explanation.
//!
//! Every backend formats the same [`ErrorContext`] with [`build_prompt`],
//! posts it through an [`HttpClient`], and pulls the answer out of its own
//! response shape. Only the endpoint, the auth headers, the request body and
//! the JSON path of the answer differ between them.

pub mod claude;
pub mod gemini;
pub mod mock;
pub mod openai;

use crate::executor::CommandOutput;
use crate::http_client::HttpClient;
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub use claude::ClaudeProvider;
pub use gemini::GeminiProvider;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;

/// Token budget shared by all providers; explanations are meant to be short.
pub const MAX_TOKENS: u32 = 150;
pub const TEMPERATURE: f64 = 0.3;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response format: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Request(#[from] anyhow::Error),
}

/// What went wrong with the wrapped command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ErrorContext {
    pub fn new(command_args: &[String], output: &CommandOutput) -> Self {
        Self {
            command: command_args.join(" "),
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
            exit_code: output.exit_code,
        }
    }
}

/// Prompt sent to every provider.
pub fn build_prompt(context: &ErrorContext) -> String {
    format!(
        "Explain this command error briefly and suggest a fix:

Command: {}
Error: {}
Exit code: {}

Respond in this exact format:
- Error: [brief error description]
- Fix: [concise fix suggestion]
- [one-line explanation]",
        context.command, context.stderr, context.exit_code
    )
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Provider name as used on the command line and in the config file.
    fn name(&self) -> &str;

    /// Asks the backend to explain `context`. Returns the trimmed answer.
    async fn explain_error(&self, context: &ErrorContext) -> Result<String, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Claude,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::OpenAi, ProviderKind::Claude, ProviderKind::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Claude => "claude",
            ProviderKind::Gemini => "gemini",
        }
    }

    /// Comma separated list of every supported provider name.
    pub fn available() -> String {
        Self::ALL.iter().map(|k| k.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "claude" => Ok(ProviderKind::Claude),
            "gemini" => Ok(ProviderKind::Gemini),
            _ => Err(ProviderError::UnknownProvider(s.to_string())),
        }
    }
}

/// Builds the provider for `kind` backed by `http`.
pub fn create_provider(kind: ProviderKind, api_key: &str, http: Arc<dyn HttpClient>) -> Box<dyn AiProvider> {
    match kind {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(api_key, http)),
        ProviderKind::Claude => Box::new(ClaudeProvider::new(api_key, http)),
        ProviderKind::Gemini => Box::new(GeminiProvider::new(api_key, http)),
    }
}

/// Posts `body` and extracts the string at `answer_pointer` (a JSON pointer).
pub(crate) async fn request_explanation(
    http: &dyn HttpClient,
    provider: &str,
    url: &str,
    headers: &[(&str, &str)],
    body: &serde_json::Value,
    answer_pointer: &str,
) -> Result<String, ProviderError> {
    debug!("Requesting explanation from {}", provider);
    let response = http.post_json(url, headers, body).await?;

    if !response.is_success() {
        warn!("{} returned HTTP {}", provider, response.status);
        return Err(ProviderError::Status {
            status: response.status,
            message: api_error_message(&response.body),
        });
    }

    let value: serde_json::Value = serde_json::from_str(&response.body)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    value
        .pointer(answer_pointer)
        .and_then(|text| text.as_str())
        .map(|text| text.trim().to_string())
        .ok_or_else(|| {
            warn!("{} response has nothing at {}", provider, answer_pointer);
            ProviderError::MalformedResponse(format!("missing {}", answer_pointer))
        })
}

/// All three APIs report failures as `{"error": {"message": ...}}`.
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
