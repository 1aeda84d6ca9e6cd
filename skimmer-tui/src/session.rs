use skimmer_common::LlmProvider;
use skimmer_llm::ConversationHandle;
use skimmer_pipeline::Pipeline;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Process-lifetime state of one chat session.
///
/// The pipeline is built lazily per provider and cached. Switching provider
/// drops both the cached pipeline and the conversation handle, since a handle
/// only means something to the provider that minted it.
pub struct ChatSession {
    provider: LlmProvider,
    turns: Vec<ConversationTurn>,
    conversation: Option<ConversationHandle>,
    pipeline: Option<Arc<Pipeline>>,
}

impl ChatSession {
    pub fn new(provider: LlmProvider) -> Self {
        Self {
            provider,
            turns: Vec::new(),
            conversation: None,
            pipeline: None,
        }
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn conversation(&self) -> Option<&ConversationHandle> {
        self.conversation.as_ref()
    }

    pub fn pipeline(&self) -> Option<Arc<Pipeline>> {
        self.pipeline.clone()
    }

    /// Returns `false` when `provider` is already active.
    pub fn switch_provider(&mut self, provider: LlmProvider) -> bool {
        if provider == self.provider {
            return false;
        }
        self.provider = provider;
        self.pipeline = None;
        self.conversation = None;
        true
    }

    /// Forget the transcript and conversation; the pipeline stays cached.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.conversation = None;
    }

    pub fn record_user(&mut self, content: impl Into<String>) {
        self.turns.push(ConversationTurn {
            role: Role::User,
            content: content.into(),
        });
    }

    /// Record an answer produced by `provider`. An answer from a provider that
    /// is no longer active is kept in the transcript but neither its handle
    /// nor its pipeline is adopted.
    pub fn record_assistant(
        &mut self,
        provider: LlmProvider,
        content: impl Into<String>,
        conversation: Option<ConversationHandle>,
        pipeline: Arc<Pipeline>,
    ) {
        self.turns.push(ConversationTurn {
            role: Role::Assistant,
            content: content.into(),
        });
        if provider == self.provider {
            self.conversation = conversation;
            self.pipeline = Some(pipeline);
        }
    }

    /// Cache a pipeline built for `provider` even though its run failed.
    pub fn adopt_pipeline(&mut self, provider: LlmProvider, pipeline: Arc<Pipeline>) {
        if provider == self.provider {
            self.pipeline = Some(pipeline);
        }
    }
}
