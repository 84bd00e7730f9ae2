use super::{AiProvider, ErrorContext, ProviderError};
use async_trait::async_trait;

/// Offline provider used when `XPLC_USE_MOCK` is set.
///
/// Answers in the same three-line format the real backends are asked for,
/// without touching the network.
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn explain_error(&self, context: &ErrorContext) -> Result<String, ProviderError> {
        let first_line = context
            .stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("no error output");

        Ok(format!(
            "- Error: `{}` exited with code {}: {}\n- Fix: check the command and its arguments\n- This explanation was generated offline (mock mode).",
            context.command, context.exit_code, first_line
        ))
    }
}
