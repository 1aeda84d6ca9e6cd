use crate::brave::SearchResult;
use async_trait::async_trait;
use skimmer_common::Result;

/// Keyword web search returning hits in provider order.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}
