use super::types::{SearchResult, WebSearchApiResponse};
use crate::search::SearchClient;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use skimmer_common::{Result, SkimmerError};
use skimmer_http::{Auth, HttpClient, RequestOpts};
use std::time::Instant;

pub const DEFAULT_BRAVE_ENDPOINT: &str = "https://api.search.brave.com/";

/// The `search.brave` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BraveSettings {
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
}

impl Default for BraveSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_BRAVE_ENDPOINT.to_string(),
            auth_token: None,
        }
    }
}

/// Minimal client for Brave Search API (web vertical).
#[derive(Clone)]
pub struct BraveClient {
    http: HttpClient,
    token: HeaderValue,
}

impl std::fmt::Debug for BraveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BraveClient")
            .field("base", &self.http.base().as_str())
            .finish_non_exhaustive()
    }
}

impl BraveClient {
    /// Fails with [`SkimmerError::Auth`] when no subscription token is set.
    pub fn new(settings: &BraveSettings) -> Result<Self> {
        let raw = settings
            .auth_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SkimmerError::Auth("BRAVE_API_KEY is not set; Brave search needs a subscription token".into())
            })?;
        let mut token = HeaderValue::from_str(raw)
            .map_err(|e| SkimmerError::Auth(format!("invalid Brave subscription token: {e}")))?;
        token.set_sensitive(true);

        let http = HttpClient::new(&settings.endpoint)
            .map_err(|e| SkimmerError::Config(format!("invalid Brave endpoint: {e}")))?;
        Ok(Self { http, token })
    }

    /// One GET to `res/v1/web/search`, no retries.
    pub async fn simple_query_search(&self, query: &str) -> Result<WebSearchApiResponse> {
        let query_snippet = snippet(query, 160);
        let path = format!("res/v1/web/search?q={}", query_terms(query));
        let started = Instant::now();
        tracing::info!(
            target: "web.brave",
            query = %query_snippet,
            "brave.simple_query.start"
        );

        let opts = RequestOpts {
            auth: Some(Auth::Header {
                name: HeaderName::from_static("x-subscription-token"),
                value: self.token.clone(),
            }),
        };

        match self.http.get_json::<WebSearchApiResponse>(&path, opts).await {
            Ok(resp) => {
                tracing::info!(
                    target: "web.brave",
                    query = %query_snippet,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    hit_count = resp.web.as_ref().map(|w| w.results.len()).unwrap_or(0),
                    "brave.simple_query.success"
                );
                Ok(resp)
            }
            Err(e) => {
                tracing::warn!(
                    target: "web.brave",
                    query = %query_snippet,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "brave.simple_query.error"
                );
                Err(SkimmerError::Request(format!("brave search request failed: {e}")))
            }
        }
    }
}

#[async_trait]
impl SearchClient for BraveClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        Ok(self.simple_query_search(query).await?.into_results())
    }
}

/// Whitespace-delimited terms, each form-urlencoded, joined with `+`.
pub fn query_terms(query: &str) -> String {
    query
        .split_whitespace()
        .map(|term| url::form_urlencoded::byte_serialize(term.as_bytes()).collect::<String>())
        .collect::<Vec<_>>()
        .join("+")
}

fn snippet(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_are_encoded_and_plus_joined() {
        assert_eq!(query_terms("  rust   async\tio "), "rust+async+io");
        assert_eq!(query_terms("c++ & café"), "c%2B%2B+%26+caf%C3%A9");
        assert_eq!(query_terms(""), "");
    }

    #[test]
    fn missing_or_blank_token_is_auth_error() {
        let err = BraveClient::new(&BraveSettings::default()).unwrap_err();
        assert!(matches!(err, SkimmerError::Auth(_)));

        let blank = BraveSettings {
            auth_token: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(BraveClient::new(&blank), Err(SkimmerError::Auth(_))));
    }

    #[test]
    fn snippet_cuts_on_char_boundary() {
        assert_eq!(snippet("héllo", 2), "hé…");
        assert_eq!(snippet("short", 10), "short");
    }
}
