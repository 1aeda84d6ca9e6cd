use crate::digest::{Digest, PageOutcome};
use crate::events::{PipelineEvent, Progress};
use crate::formulator::QueryFormulator;
use crate::settings::{EmptyPagePolicy, PipelineSettings};
use crate::summarizer::Summarizer;
use skimmer_common::{Result, SkimmerError};
use skimmer_llm::ConversationHandle;
use skimmer_web::{ExtractedPage, PageExtractor, SearchClient, SearchResult};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// Where the first search query comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuerySource {
    /// Searched as typed.
    Literal(String),
    /// Run through the formulator first.
    Formulate(String),
}

impl QuerySource {
    /// The user's original text.
    pub fn text(&self) -> &str {
        match self {
            QuerySource::Literal(s) | QuerySource::Formulate(s) => s,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DigestRequest {
    pub source: QuerySource,
    /// Prepended to the summarizer input as `Question: …`.
    pub question: Option<String>,
    /// Most recent summarizer handle, for follow-up turns.
    pub conversation: Option<ConversationHandle>,
}

impl DigestRequest {
    pub fn literal(query: impl Into<String>) -> Self {
        Self {
            source: QuerySource::Literal(query.into()),
            question: None,
            conversation: None,
        }
    }

    /// A chat prompt: formulated into a query and passed along as the question.
    pub fn prompt(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self {
            question: Some(prompt.clone()),
            source: QuerySource::Formulate(prompt),
            conversation: None,
        }
    }

    pub fn with_conversation(mut self, conversation: Option<ConversationHandle>) -> Self {
        self.conversation = conversation;
        self
    }
}

/// Formulate, search, read, summarize.
pub struct Pipeline {
    search: Arc<dyn SearchClient>,
    formulator: QueryFormulator,
    summarizer: Summarizer,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        search: Arc<dyn SearchClient>,
        formulator: QueryFormulator,
        summarizer: Summarizer,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            search,
            formulator,
            summarizer,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one digest. Pages are read sequentially through `extractor`;
    /// progress goes to `events` when given.
    pub async fn run(
        &self,
        request: &DigestRequest,
        extractor: &mut dyn PageExtractor,
        events: Option<&UnboundedSender<PipelineEvent>>,
    ) -> Result<Digest> {
        let progress = Progress(events);
        let started = Instant::now();

        let (query, results, search_attempts) =
            self.search_until_results(&request.source, progress).await?;

        let total = results.len().min(self.settings.max_results);
        let settle = self.settings.settle_delay();
        let mut outcomes = Vec::with_capacity(total);
        let mut pieces: Vec<String> = Vec::new();

        for (i, result) in results.into_iter().take(total).enumerate() {
            let index = i + 1;
            progress.emit(PipelineEvent::Reading {
                index,
                total,
                title: result.title.clone(),
                url: result.url.clone(),
            });

            let page = extractor.extract_page(&result.url, settle).await;
            match &page {
                Some(p) => progress.emit(PipelineEvent::PageRead {
                    index,
                    paragraphs: p.paragraphs.len(),
                }),
                None => progress.emit(PipelineEvent::PageFailed {
                    index,
                    url: result.url.clone(),
                }),
            }

            fold_page(
                &mut pieces,
                &result,
                page.as_ref(),
                self.settings.empty_page_policy,
            );
            outcomes.push(PageOutcome { result, page });
        }

        let content = pieces.join(self.settings.content_delimiter.as_str());
        let pages_read = outcomes.iter().filter(|o| o.page.is_some()).count();
        progress.emit(PipelineEvent::Summarizing { pages_read, total });

        let reply = self
            .summarizer
            .summarize(
                &content,
                request.question.as_deref(),
                request.conversation.as_ref(),
            )
            .await?;

        tracing::info!(
            target: "pipeline",
            query = %query,
            search_attempts,
            pages_read,
            total,
            content_len = content.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline.run.complete"
        );

        Ok(Digest {
            query,
            search_attempts,
            outcomes,
            content,
            summary: reply.text,
            conversation: reply.conversation,
        })
    }

    /// Search until a query returns results, reformulating from the original
    /// text after every empty attempt.
    async fn search_until_results(
        &self,
        source: &QuerySource,
        progress: Progress<'_>,
    ) -> Result<(String, Vec<SearchResult>, usize)> {
        let max_attempts = self.settings.max_search_attempts.max(1);

        for attempt in 1..=max_attempts {
            let query = match source {
                QuerySource::Literal(q) if attempt == 1 => q.trim().to_string(),
                _ => self.formulator.formulate(source.text()).await?,
            };
            progress.emit(PipelineEvent::QueryChosen {
                attempt,
                query: query.clone(),
            });

            let results = self.search.search(&query).await?;
            progress.emit(PipelineEvent::SearchCompleted {
                attempt,
                results: results.len(),
            });

            if !results.is_empty() {
                return Ok((query, results, attempt));
            }
            tracing::info!(target: "pipeline", attempt, query = %query, "pipeline.search.empty");
        }

        tracing::warn!(target: "pipeline", attempts = max_attempts, "pipeline.search.exhausted");
        Err(SkimmerError::NoResults {
            attempts: max_attempts,
        })
    }
}

/// Title and paragraphs of a readable page; for an unreadable or
/// paragraph-less page, whatever `policy` allows.
fn fold_page(
    pieces: &mut Vec<String>,
    result: &SearchResult,
    page: Option<&ExtractedPage>,
    policy: EmptyPagePolicy,
) {
    let paragraphs = page.map(|p| p.paragraphs.as_slice()).unwrap_or_default();
    if paragraphs.is_empty() && policy == EmptyPagePolicy::Skip {
        return;
    }
    if !result.title.is_empty() {
        pieces.push(result.title.clone());
    }
    pieces.extend(paragraphs.iter().cloned());
}
