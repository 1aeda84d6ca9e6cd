//! Provider-bound agent: a client plus fixed system instructions.

use crate::traits::{ConversationHandle, GenerateOptions, LlmClient};
use skimmer_common::{LlmProvider, Result, SkimmerError};
use std::sync::Arc;

/// Text of one agent turn together with the handle that continues it.
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    pub conversation: Option<ConversationHandle>,
}

/// An LLM client bound to one set of system instructions.
///
/// The agent holds no conversation state. Callers pass the most recent
/// [`ConversationHandle`] to [`Agent::invoke_with`] for continuity.
#[derive(Clone)]
pub struct Agent {
    client: Arc<dyn LlmClient>,
    instructions: String,
}

impl Agent {
    pub fn new(client: Arc<dyn LlmClient>, instructions: impl Into<String>) -> Result<Self> {
        let instructions = instructions.into();
        if instructions.trim().is_empty() {
            return Err(SkimmerError::Config(
                "agent instructions must not be empty".to_string(),
            ));
        }
        Ok(Self {
            client,
            instructions,
        })
    }

    pub fn provider(&self) -> LlmProvider {
        self.client.provider()
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Single-shot call in a fresh context.
    pub async fn invoke(&self, prompt: &str) -> Result<String> {
        Ok(self.invoke_with(prompt, None).await?.text)
    }

    pub async fn invoke_with(
        &self,
        prompt: &str,
        conversation: Option<&ConversationHandle>,
    ) -> Result<AgentReply> {
        let options = GenerateOptions { conversation };
        let resp = self
            .client
            .generate(prompt, Some(&self.instructions), options)
            .await?;
        Ok(AgentReply {
            text: resp.text,
            conversation: resp.conversation,
        })
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("provider", &self.client.provider())
            .field("model", &self.client.model_name())
            .finish_non_exhaustive()
    }
}
