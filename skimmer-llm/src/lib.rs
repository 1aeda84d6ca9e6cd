//! Provider‑agnostic LLM integration for Skimmer.
//!
//! This crate exposes a common [`traits::LlmClient`] interface with concrete
//! implementations for Ollama and the OpenAI Responses API, the
//! provider-bound [`Agent`], and [`ensure_llm_ready`] which builds a client
//! from [`LlmSettings`].
//!
//! # Examples
//! ```no_run
//! use skimmer_common::{LlmProvider, Result};
//! use skimmer_llm::{ensure_llm_ready, Agent, LlmSettings};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let client = ensure_llm_ready(LlmProvider::Ollama, &LlmSettings::default()).await?;
//! let agent = Agent::new(client, "Answer in one sentence.")?;
//! let reply = agent.invoke_with("What is Rust?", None).await?;
//! let follow_up = agent
//!     .invoke_with("Who maintains it?", reply.conversation.as_ref())
//!     .await?;
//! println!("{}", follow_up.text);
//! # Ok(())
//! # }
//! ```
pub mod agent;
pub mod ollama;
pub mod openai;
pub mod traits;

pub use agent::{Agent, AgentReply};
pub use traits::{ConversationHandle, GenerateOptions, LlmClient, LlmResponse};

use ollama::OllamaClient;
use openai::OpenAiClient;
use serde::{Deserialize, Serialize};
use skimmer_common::LlmProvider;
use std::sync::Arc;

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-nano";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: Option<f32>,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OLLAMA_ENDPOINT.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub endpoint: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    pub temperature: Option<f32>,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            endpoint: openai::OPENAI_API_BASE.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            auth_token: None,
            temperature: None,
        }
    }
}

/// Per-provider connection settings; the `llm` config section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub ollama: OllamaSettings,
    pub openai: OpenAiSettings,
}

/// Build a ready client for `provider` (pulling the Ollama model if needed).
pub async fn ensure_llm_ready(
    provider: LlmProvider,
    settings: &LlmSettings,
) -> skimmer_common::Result<Arc<dyn LlmClient>> {
    tracing::info!(target: "llm", %provider, "llm.client.init");
    match provider {
        LlmProvider::Ollama => {
            let s = &settings.ollama;
            let client = OllamaClient::new(s.endpoint.clone(), s.model.clone())
                .await?
                .with_temperature(s.temperature);
            Ok(Arc::new(client))
        }
        LlmProvider::OpenAi => {
            let s = &settings.openai;
            let client = OpenAiClient::new(s.auth_token.clone(), s.model.clone())?
                .with_base_url(&s.endpoint)?
                .with_temperature(s.temperature);
            Ok(Arc::new(client))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn openai_without_key_fails_before_any_request() {
        let err = ensure_llm_ready(LlmProvider::OpenAi, &LlmSettings::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, skimmer_common::SkimmerError::Config(_)));
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let s: LlmSettings =
            serde_json::from_value(serde_json::json!({"ollama": {"model": "qwen2.5"}})).unwrap();
        assert_eq!(s.ollama.model, "qwen2.5");
        assert_eq!(s.ollama.endpoint, DEFAULT_OLLAMA_ENDPOINT);
        assert_eq!(s.openai.model, DEFAULT_OPENAI_MODEL);
    }
}
