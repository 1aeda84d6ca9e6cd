//! Web discovery and acquisition.
//!
//! - Brave Search API client (`brave`) behind the [`SearchClient`] trait
//! - Browser abstraction and its fantoccini implementation (`browser`)
//! - Fixed-schema HTML extraction (`extract`)
//! - Session-holding page extractor (`extractor`)

pub mod brave;
pub mod browser;
pub mod extract;
pub mod extractor;
pub mod search;

pub use brave::{BraveClient, BraveSettings, SearchResult};
pub use browser::Browser;
pub use extract::{ExtractedPage, Headings, extract_page};
pub use extractor::{BrowserExtractor, Extraction, OutputFormat, PageExtractor};
pub use search::SearchClient;
