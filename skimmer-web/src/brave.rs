//! Brave Search API (web vertical).

pub mod client;
pub mod types;

pub use client::{BraveClient, BraveSettings};
pub use types::{SearchResult, WebSearchApiResponse};
