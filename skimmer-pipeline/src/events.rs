use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// Progress of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    QueryChosen { attempt: usize, query: String },
    SearchCompleted { attempt: usize, results: usize },
    /// `index` is 1-based.
    Reading {
        index: usize,
        total: usize,
        title: String,
        url: String,
    },
    PageRead { index: usize, paragraphs: usize },
    PageFailed { index: usize, url: String },
    Summarizing { pages_read: usize, total: usize },
}

impl fmt::Display for PipelineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineEvent::QueryChosen { attempt, query } => {
                write!(f, "Searching for '{query}' (attempt {attempt})")
            }
            PipelineEvent::SearchCompleted { results, .. } => {
                write!(f, "Found {results} result(s)")
            }
            PipelineEvent::Reading {
                index,
                total,
                title,
                url,
            } => write!(f, "Reading {index}/{total}: '{title}' from {url}"),
            PipelineEvent::PageRead { index, paragraphs } => {
                write!(f, "Read page {index} ({paragraphs} paragraph(s))")
            }
            PipelineEvent::PageFailed { index, url } => {
                write!(f, "Could not read page {index} ({url})")
            }
            PipelineEvent::Summarizing { pages_read, total } => {
                write!(f, "Summarizing {pages_read} of {total} page(s)")
            }
        }
    }
}

/// Optional event sink; a closed receiver is ignored.
#[derive(Clone, Copy)]
pub(crate) struct Progress<'a>(pub(crate) Option<&'a UnboundedSender<PipelineEvent>>);

impl Progress<'_> {
    pub(crate) fn emit(&self, event: PipelineEvent) {
        tracing::debug!(target: "pipeline", event = ?event, "pipeline.progress");
        if let Some(tx) = self.0 {
            let _ = tx.send(event);
        }
    }
}
