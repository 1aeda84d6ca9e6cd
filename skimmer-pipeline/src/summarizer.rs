use crate::prompts::news_summary_instructions;
use skimmer_common::Result;
use skimmer_llm::{Agent, ConversationHandle, LlmClient};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SummaryReply {
    pub text: String,
    /// Pass back on the next call to continue the conversation.
    pub conversation: Option<ConversationHandle>,
}

/// Produces a natural-language digest of aggregated page text.
#[derive(Debug, Clone)]
pub struct Summarizer {
    agent: Agent,
}

impl Summarizer {
    /// `instructions` replaces the default news-digest preamble.
    pub fn new(client: Arc<dyn LlmClient>, instructions: Option<String>) -> Result<Self> {
        let instructions = instructions.unwrap_or_else(news_summary_instructions);
        Ok(Self {
            agent: Agent::new(client, instructions)?,
        })
    }

    pub fn instructions(&self) -> &str {
        self.agent.instructions()
    }

    pub async fn summarize(
        &self,
        content: &str,
        question: Option<&str>,
        previous: Option<&ConversationHandle>,
    ) -> Result<SummaryReply> {
        if content.trim().is_empty() {
            tracing::warn!(target: "pipeline", "pipeline.summarize.empty_content");
        }
        let prompt = summary_prompt(content, question);
        let reply = self.agent.invoke_with(&prompt, previous).await?;
        Ok(SummaryReply {
            text: reply.text,
            conversation: reply.conversation,
        })
    }
}

/// Content, prefixed with `Question: …` when the user's question is known.
pub fn summary_prompt(content: &str, question: Option<&str>) -> String {
    match question.map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => format!("Question: {q}\n\n{content}"),
        None => content.to_string(),
    }
}
