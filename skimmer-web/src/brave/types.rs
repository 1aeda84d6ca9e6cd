use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level body of `GET res/v1/web/search`.
///
/// Only the `web` vertical is modelled; other sections (news, videos, mixed
/// ordering, infobox, ...) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSearchApiResponse {
    /// Always "search"
    #[serde(rename = "type", default)]
    pub r#type: Option<String>,

    #[serde(default)]
    pub web: Option<Search>,
}

impl WebSearchApiResponse {
    /// Web results in provider order; empty when the section is absent.
    pub fn into_results(self) -> Vec<SearchResult> {
        self.web.map(|w| w.results).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub family_friendly: Option<bool>,
}

/// One web search hit.
///
/// `title` and `url` are what the digest reads; every other field Brave sends
/// (`age`, `meta_url`, `extra_snippets`, `language`, ...) is kept verbatim in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: None,
            extra: Map::new(),
        }
    }
}
