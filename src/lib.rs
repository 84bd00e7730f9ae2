//! xplc - run a command and have an AI explain why it failed.
//!
//! The library provides everything behind the `xplc` binary:
//!
//! - **Command execution** with a fixed timeout and captured output
//! - **Error context** built from the failed command
//! - **AI providers** (OpenAI, Claude, Gemini) behind one trait
//! - **Configuration** of API keys and the default provider
//!
//! # Architecture
//!
//! - [`config`] - Configuration management (API keys, default provider)
//! - [`executor`] - Runs the wrapped command
//! - [`providers`] - Prompt construction and the AI backends
//! - [`http_client`] - HTTP client abstraction
//! - [`explainer`] - Glues the pieces together
//!
//! # Example
//!
//! ```ignore
//! use xplc::{config::Config, explainer::ErrorExplainer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let explainer = ErrorExplainer::new(Config::load()?);
//!
//!     // Runs `cargo build`; if it fails, the default provider explains why.
//!     explainer
//!         .explain(&["cargo".to_string(), "build".to_string()], None)
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! Keys live in `~/.xplc/config.json` (or `$XPLC_HOME/config.json`):
//!
//! ```bash
//! xplc config --set-key gemini YOUR_API_KEY
//! xplc config --default gemini
//! xplc config --list
//! ```
//!
//! `OPENAI_API_KEY`, `ANTHROPIC_API_KEY` and `GEMINI_API_KEY` take
//! precedence over stored keys without being written back.

pub mod config;
pub mod executor;
pub mod explainer;
pub mod http_client;
pub mod providers;
