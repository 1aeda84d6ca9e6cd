use crate::prompts::FORMULATOR_INSTRUCTIONS;
use skimmer_common::Result;
use skimmer_llm::{Agent, LlmClient};
use std::sync::Arc;

/// Turns a free-form prompt into one compact search query.
#[derive(Debug, Clone)]
pub struct QueryFormulator {
    agent: Agent,
}

impl QueryFormulator {
    pub fn new(client: Arc<dyn LlmClient>) -> Result<Self> {
        Ok(Self {
            agent: Agent::new(client, FORMULATOR_INSTRUCTIONS)?,
        })
    }

    pub async fn formulate(&self, prompt: &str) -> Result<String> {
        let raw = self.agent.invoke(prompt).await?;
        let query = clean_query(&raw);
        tracing::info!(target: "pipeline", raw = %raw.trim(), query = %query, "pipeline.query.formulated");
        Ok(query)
    }
}

/// Drops `? ! . ,` and surrounding whitespace from model output.
pub fn clean_query(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '?' | '!' | '.' | ','))
        .collect::<String>()
        .trim()
        .to_string()
}
