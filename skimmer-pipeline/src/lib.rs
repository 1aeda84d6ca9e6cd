//! Search digest pipeline.
//!
//! Turns a query (or a free-form prompt) into a summary of the top web
//! results: formulate, search, read pages, summarize.
//!
//! - [`QueryFormulator`]: prompt to one compact search query
//! - [`Summarizer`]: aggregated page text to a short digest
//! - [`Pipeline`]: the sequential orchestration, reporting [`PipelineEvent`]s
//! - [`PipelineFactory`]: provider-bound pipelines and fresh page extractors
//!   for long-lived sessions such as the chat interface

pub mod digest;
pub mod events;
pub mod factory;
pub mod formulator;
pub mod orchestrator;
pub mod prompts;
pub mod settings;
pub mod summarizer;

pub use digest::{Coverage, Digest, PageOutcome};
pub use events::PipelineEvent;
pub use factory::PipelineFactory;
pub use formulator::QueryFormulator;
pub use orchestrator::{DigestRequest, Pipeline, QuerySource};
pub use settings::{EmptyPagePolicy, PipelineSettings};
pub use summarizer::{SummaryReply, Summarizer};
