use async_trait::async_trait;
use skimmer_common::{LlmProvider, Result};

/// Opaque, provider-issued token that continues a conversation.
///
/// A handle is only meaningful to the provider that minted it. Clients treat a
/// foreign handle as absent and start a fresh context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHandle(HandleKind);

#[derive(Debug, Clone, PartialEq, Eq)]
enum HandleKind {
    OpenAi { response_id: String },
    Ollama { context: Vec<i64> },
}

impl ConversationHandle {
    /// Handle backed by a Responses API `id`.
    pub fn openai(response_id: impl Into<String>) -> Self {
        Self(HandleKind::OpenAi {
            response_id: response_id.into(),
        })
    }

    /// Handle backed by the token `context` array returned from `/api/generate`.
    pub fn ollama(context: Vec<i64>) -> Self {
        Self(HandleKind::Ollama { context })
    }

    pub fn provider(&self) -> LlmProvider {
        match &self.0 {
            HandleKind::OpenAi { .. } => LlmProvider::OpenAi,
            HandleKind::Ollama { .. } => LlmProvider::Ollama,
        }
    }

    pub(crate) fn response_id(&self) -> Option<&str> {
        match &self.0 {
            HandleKind::OpenAi { response_id } => Some(response_id),
            HandleKind::Ollama { .. } => None,
        }
    }

    pub(crate) fn context(&self) -> Option<&[i64]> {
        match &self.0 {
            HandleKind::Ollama { context } => Some(context),
            HandleKind::OpenAi { .. } => None,
        }
    }
}

/// Per-call knobs for [`LlmClient::generate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions<'a> {
    /// Most recent handle of the conversation, if any.
    pub conversation: Option<&'a ConversationHandle>,
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    /// Handle to pass back for a follow-up turn.
    pub conversation: Option<ConversationHandle>,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt with optional system prompt
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        options: GenerateOptions<'_>,
    ) -> Result<LlmResponse>;

    /// Get the model name being used
    fn model_name(&self) -> &str;

    fn provider(&self) -> LlmProvider;

    /// Returns the handle only when it was minted by this client's provider.
    fn accept_handle<'h>(
        &self,
        handle: Option<&'h ConversationHandle>,
    ) -> Option<&'h ConversationHandle> {
        match handle {
            Some(h) if h.provider() == self.provider() => Some(h),
            Some(h) => {
                tracing::warn!(
                    target: "llm",
                    handle_provider = %h.provider(),
                    client_provider = %self.provider(),
                    "llm.handle.foreign_ignored"
                );
                None
            }
            None => None,
        }
    }
}
