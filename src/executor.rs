//! Command execution for the wrapped command.
//!
//! The executor runs a single program (no shell), captures its output, and
//! enforces a fixed timeout. It never fails: spawn errors and timeouts are
//! folded into a [`CommandOutput`] with exit code 1 so the caller always has
//! an error context to explain.

use anyhow::Result;
use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{error, info, warn};

/// How long the wrapped command may run before it is killed.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured result of running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    fn failure(stderr: String) -> Self {
        Self {
            stdout: String::new(),
            stderr,
            exit_code: 1,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

// =============================================================================
// Traits for Dependency Injection
// =============================================================================

/// Trait for running system processes.
///
/// This abstraction enables testing without spawning real processes.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Executes a command and returns its output.
    ///
    /// Dropping the returned future must stop the process.
    async fn run(&self, program: &str, args: &[String]) -> Result<Output>;

    /// Checks if a program exists in PATH.
    fn program_exists(&self, program: &str) -> bool;
}

/// Default process runner using tokio's process support.
pub struct SystemProcessRunner;

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<Output> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;
        Ok(output)
    }

    fn program_exists(&self, program: &str) -> bool {
        // Paths are left to the OS to resolve.
        if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
            return true;
        }
        which::which(program).is_ok()
    }
}

// =============================================================================
// Executor Implementation
// =============================================================================

/// Runs the wrapped command with a timeout.
///
/// # Example
///
/// ```ignore
/// let executor = Executor::new();
/// let output = executor.run_command(&["ls".to_string(), "-la".to_string()]).await;
/// println!("exit code {}", output.exit_code);
/// ```
pub struct Executor {
    runner: Box<dyn ProcessRunner>,
    timeout: Duration,
}

impl Executor {
    pub fn new() -> Self {
        Self::with_runner(Box::new(SystemProcessRunner), COMMAND_TIMEOUT)
    }

    /// Creates an executor with injected dependencies (for testing).
    pub fn with_runner(runner: Box<dyn ProcessRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    /// Runs `args[0]` with the remaining arguments and captures its output.
    pub async fn run_command(&self, args: &[String]) -> CommandOutput {
        let Some((program, program_args)) = args.split_first() else {
            return CommandOutput::failure("Failed to run command: no command provided".to_string());
        };

        info!("Executing command: {} {:?}", program, program_args);

        if !self.runner.program_exists(program) {
            warn!("Program '{}' not found in PATH", program);
            return CommandOutput::failure(format!(
                "Failed to run command: '{}' not found in PATH",
                program
            ));
        }

        match tokio::time::timeout(self.timeout, self.runner.run(program, program_args)).await {
            Err(_) => {
                warn!("Command timed out after {:?}", self.timeout);
                CommandOutput::failure(format!(
                    "Command timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            }
            Ok(Err(e)) => {
                error!("Failed to run command: {}", e);
                CommandOutput::failure(format!("Failed to run command: {}", e))
            }
            Ok(Ok(output)) => {
                let exit_code = exit_code(&output);
                info!("Command exited with code {}", exit_code);
                CommandOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    exit_code,
                }
            }
        }
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

/// Process exit code; `-signal` for processes killed by a signal.
fn exit_code(output: &Output) -> i32 {
    if let Some(code) = output.status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = output.status.signal() {
            return -signal;
        }
    }

    1
}
