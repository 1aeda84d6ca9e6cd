use skimmer_llm::ConversationHandle;
use skimmer_web::{ExtractedPage, SearchResult};
use std::fmt;

/// One consumed search result; `page` is `None` when extraction failed.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub result: SearchResult,
    pub page: Option<ExtractedPage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub read: usize,
    pub total: usize,
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} pages read", self.read, self.total)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct Digest {
    /// The query that produced the results.
    pub query: String,
    pub search_attempts: usize,
    pub outcomes: Vec<PageOutcome>,
    /// Exactly what the summarizer was given (before any question prefix).
    pub content: String,
    pub summary: String,
    pub conversation: Option<ConversationHandle>,
}

impl Digest {
    pub fn coverage(&self) -> Coverage {
        Coverage {
            read: self.outcomes.iter().filter(|o| o.page.is_some()).count(),
            total: self.outcomes.len(),
        }
    }
}
