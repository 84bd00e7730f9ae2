use crate::{
    config::Config,
    executor::{CommandOutput, Executor},
    http_client::{HttpClient, ReqwestHttpClient},
    providers::{create_provider, AiProvider, ErrorContext, MockProvider, ProviderKind},
};
use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

/// How a run of [`ErrorExplainer::explain`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplainOutcome {
    NoCommand,
    Succeeded,
    Explained,
    ProviderUnavailable,
    ExplanationFailed,
}

/// Runs a command and, when it fails, asks an AI provider what went wrong.
pub struct ErrorExplainer {
    config: Config,
    executor: Executor,
    http: Arc<dyn HttpClient>,
}

impl ErrorExplainer {
    pub fn new(config: Config) -> Result<Self> {
        let http = ReqwestHttpClient::new()?;
        Ok(Self::with_deps(config, Executor::new(), Arc::new(http)))
    }

    /// Creates an explainer with injected dependencies (for testing).
    pub fn with_deps(config: Config, executor: Executor, http: Arc<dyn HttpClient>) -> Self {
        Self { config, executor, http }
    }

    pub async fn explain(&self, command_args: &[String], provider_name: Option<&str>) -> Result<ExplainOutcome> {
        self.explain_with_io(
            command_args,
            provider_name,
            &mut std::io::stdout(),
            &mut std::io::stderr(),
        )
        .await
    }

    /// Runs the command and explains any error, writing to the given streams.
    pub async fn explain_with_io<W1: Write, W2: Write>(
        &self,
        command_args: &[String],
        provider_name: Option<&str>,
        stdout: &mut W1,
        stderr: &mut W2,
    ) -> Result<ExplainOutcome> {
        if command_args.is_empty() {
            writeln!(stdout, "No command provided")?;
            return Ok(ExplainOutcome::NoCommand);
        }

        let output = self.executor.run_command(command_args).await;

        if output.success() {
            Self::write_streams(&output, stdout, stderr)?;
            return Ok(ExplainOutcome::Succeeded);
        }

        writeln!(stdout, "Original command output:")?;
        Self::write_streams(&output, stdout, stderr)?;
        writeln!(stdout)?;

        let Some(provider) = self.get_provider(provider_name, stdout)? else {
            return Ok(ExplainOutcome::ProviderUnavailable);
        };

        let context = ErrorContext::new(command_args, &output);
        info!("Asking {} to explain exit code {}", provider.name(), context.exit_code);

        writeln!(stdout, "{}", "AI Explanation:".cyan())?;
        match provider.explain_error(&context).await {
            Ok(explanation) => {
                writeln!(stdout, "{}", explanation.green())?;
                Ok(ExplainOutcome::Explained)
            }
            Err(e) => {
                warn!("{} failed: {}", provider.name(), e);
                writeln!(stdout, "{}", format!("Failed to get AI explanation: {}", e).red())?;
                Ok(ExplainOutcome::ExplanationFailed)
            }
        }
    }

    /// Resolves the provider to use, explaining on `out` why none is available.
    ///
    /// `None` selects the configured default.
    pub fn get_provider<W: Write>(&self, provider_name: Option<&str>, out: &mut W) -> Result<Option<Box<dyn AiProvider>>> {
        let name = provider_name.unwrap_or_else(|| self.config.get_default_provider());

        if self.config.is_mock_mode() {
            info!("Using mock provider (XPLC_USE_MOCK is set)");
            return Ok(Some(Box::new(MockProvider::new())));
        }

        let Some(api_key) = self.config.get_api_key(name) else {
            writeln!(out, "{}", format!("No API key found for {}", name).red())?;
            writeln!(
                out,
                "{}",
                format!("Set it with: xplc config --set-key {} YOUR_API_KEY", name).yellow()
            )?;
            return Ok(None);
        };

        match name.parse::<ProviderKind>() {
            Ok(kind) => Ok(Some(create_provider(kind, api_key, Arc::clone(&self.http)))),
            Err(e) => {
                writeln!(out, "{}", e.to_string().red())?;
                writeln!(out, "{}", format!("Available: {}", ProviderKind::available()).yellow())?;
                Ok(None)
            }
        }
    }

    fn write_streams<W1: Write, W2: Write>(output: &CommandOutput, stdout: &mut W1, stderr: &mut W2) -> Result<()> {
        if !output.stdout.is_empty() {
            write!(stdout, "{}", output.stdout)?;
        }
        // Some tools print warnings to stderr even on success.
        if !output.stderr.is_empty() {
            write!(stderr, "{}", output.stderr)?;
        }
        Ok(())
    }
}
