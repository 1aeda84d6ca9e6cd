use async_trait::async_trait;
use skimmer_common::{LlmProvider, Result};
use skimmer_config::SkimmerConfig;
use skimmer_llm::ensure_llm_ready;
use skimmer_pipeline::{Pipeline, PipelineFactory, QueryFormulator, Summarizer};
use skimmer_web::{BraveClient, BrowserExtractor, PageExtractor};
use std::sync::Arc;

/// Wires Brave search, the selected LLM and Chrome from one loaded config.
pub struct AppFactory {
    config: SkimmerConfig,
    summary_instructions: Option<String>,
}

impl AppFactory {
    /// `summary_instructions` of `None` keeps the plain-text digest prompt.
    pub fn new(config: SkimmerConfig, summary_instructions: Option<String>) -> Self {
        Self {
            config,
            summary_instructions,
        }
    }
}

#[async_trait]
impl PipelineFactory for AppFactory {
    async fn pipeline(&self, provider: LlmProvider) -> Result<Pipeline> {
        let search = Arc::new(BraveClient::new(&self.config.search.brave)?);
        let llm = ensure_llm_ready(provider, &self.config.llm).await?;
        tracing::info!(
            target: "app",
            %provider,
            model = llm.model_name(),
            max_results = self.config.pipeline.max_results,
            "app.pipeline.ready"
        );

        Ok(Pipeline::new(
            search,
            QueryFormulator::new(llm.clone())?,
            Summarizer::new(llm, self.summary_instructions.clone())?,
            self.config.pipeline.clone(),
        ))
    }

    async fn extractor(&self) -> Result<Box<dyn PageExtractor>> {
        let extractor = BrowserExtractor::launch(&self.config.browser).await?;
        Ok(Box::new(extractor))
    }
}
