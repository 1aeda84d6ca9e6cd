use crate::orchestrator::Pipeline;
use async_trait::async_trait;
use skimmer_common::{LlmProvider, Result};
use skimmer_web::PageExtractor;

/// Builds what a long-lived session needs for each run.
#[async_trait]
pub trait PipelineFactory: Send + Sync {
    /// A pipeline whose agents are bound to `provider`.
    async fn pipeline(&self, provider: LlmProvider) -> Result<Pipeline>;

    /// A freshly launched extractor; the caller closes it after the run.
    async fn extractor(&self) -> Result<Box<dyn PageExtractor>>;
}
