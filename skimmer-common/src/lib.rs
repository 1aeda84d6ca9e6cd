//! Common types and utilities shared across Skimmer crates.
//!
//! This crate defines the provider selector, observability helpers, and the
//! shared error taxonomy used throughout the Skimmer workspace. It is
//! intentionally lightweight so that every crate can depend on it.
//!
//! # Overview
//!
//! - [`LlmProvider`]: which chat backend an agent is bound to
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`SkimmerError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use skimmer_common::LlmProvider;
//!
//! let provider: LlmProvider = "openai".parse().unwrap();
//! assert_eq!(provider, LlmProvider::OpenAi);
//! assert_eq!(provider.to_string(), "openai");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Chat backend an agent is bound to at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// Locally hosted open-weight model server.
    #[default]
    Ollama,
    /// Hosted OpenAI Responses API.
    #[serde(rename = "openai")]
    OpenAi,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 2] = [LlmProvider::Ollama, LlmProvider::OpenAi];

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Ollama => "ollama",
            LlmProvider::OpenAi => "openai",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(format!(
                "unknown provider '{other}', expected 'ollama' or 'openai'"
            )),
        }
    }
}

/// Error types used across the Skimmer system.
#[derive(thiserror::Error, Debug)]
pub enum SkimmerError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required API credential is missing.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The search transport failed or returned a non-success status.
    #[error("Request error: {0}")]
    Request(String),

    /// The LLM provider failed to answer.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The browser driver reported an error.
    #[error("Driver error: {0}")]
    Driver(#[from] anyhow::Error),

    /// Every search attempt came back empty.
    #[error("No search results found after {attempts} attempt(s)")]
    NoResults { attempts: usize },
}

/// Convenient alias for results that use [`SkimmerError`].
pub type Result<T> = std::result::Result<T, SkimmerError>;
