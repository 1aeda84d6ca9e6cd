use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a result contributes when its page could not be read or had no
/// paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyPagePolicy {
    /// The result title is still folded into the content.
    #[default]
    KeepTitle,
    /// The result contributes nothing.
    Skip,
}

/// The `pipeline` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Number of top results whose pages are read.
    pub max_results: usize,
    /// Wait after DOM-ready before snapshotting a page.
    pub settle_delay_ms: u64,
    /// Searches tried (first query plus reformulations) before giving up.
    pub max_search_attempts: usize,
    pub empty_page_policy: EmptyPagePolicy,
    /// Joins titles and paragraphs into the summarizer input.
    pub content_delimiter: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_results: 4,
            settle_delay_ms: 1000,
            max_search_attempts: 3,
            empty_page_policy: EmptyPagePolicy::KeepTitle,
            content_delimiter: "\n".to_string(),
        }
    }
}

impl PipelineSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
