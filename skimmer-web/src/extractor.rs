use crate::browser::Browser;
use crate::extract::{ExtractedPage, extract_page};
use async_trait::async_trait;
use skimmer_common::{Result, SkimmerError};
use skimmer_drivers::skimmer_browser::{driver::SkimmerDriver, options::BrowserSettings};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

/// How long to wait for a `body` element after navigation.
pub const DOM_READY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The [`ExtractedPage`] schema, printed as JSON.
    Structured,
    /// Flattened lines.
    #[default]
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "structured" => Ok(OutputFormat::Structured),
            "text" => Ok(OutputFormat::Text),
            other => Err(format!("unknown format '{other}', expected 'text' or 'json'")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Structured => "json",
            OutputFormat::Text => "text",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Structured(ExtractedPage),
    Text(Vec<String>),
}

/// Structured page extraction, as the orchestrator consumes it.
#[async_trait]
pub trait PageExtractor: Send {
    /// `None` when the page could not be loaded or read.
    async fn extract_page(&mut self, url: &str, settle: Duration) -> Option<ExtractedPage>;

    async fn close(&mut self) -> Result<()>;
}

/// Holds one browser session for its lifetime and extracts pages through it.
///
/// Call [`BrowserExtractor::close`] when done. Extraction after close yields
/// `None`.
pub struct BrowserExtractor<B: Browser> {
    browser: Option<B>,
}

impl BrowserExtractor<SkimmerDriver> {
    /// Open a WebDriver session according to `settings`.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let driver = SkimmerDriver::launch(settings).await?;
        Ok(Self::new(driver))
    }
}

impl<B: Browser> BrowserExtractor<B> {
    pub fn new(browser: B) -> Self {
        Self {
            browser: Some(browser),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.browser.is_none()
    }

    /// Load `url`, wait for DOM-ready plus `settle`, and extract its content.
    ///
    /// Failures are logged and reported as `None`.
    pub async fn extract(
        &mut self,
        url: &str,
        format: OutputFormat,
        settle: Duration,
    ) -> Option<Extraction> {
        let page = self.load(url, settle).await?;
        Some(match format {
            OutputFormat::Structured => Extraction::Structured(page),
            OutputFormat::Text => Extraction::Text(page.to_lines()),
        })
    }

    async fn load(&mut self, url: &str, settle: Duration) -> Option<ExtractedPage> {
        let Some(browser) = self.browser.as_mut() else {
            tracing::warn!(target: "web.extract", url, "extract.page.closed");
            return None;
        };
        let started = Instant::now();

        let html = match snapshot(browser, url, settle).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(
                    target: "web.extract",
                    url,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "extract.page.failed"
                );
                return None;
            }
        };

        let page = extract_page(&html);
        tracing::info!(
            target: "web.extract",
            url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            html_len = html.len(),
            paragraphs = page.paragraphs.len(),
            "extract.page.success"
        );
        Some(page)
    }

    /// Release the browser session. Later calls are no-ops.
    pub async fn close(&mut self) -> Result<()> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };
        browser.close().await.map_err(SkimmerError::Driver)
    }
}

async fn snapshot<B: Browser>(browser: &mut B, url: &str, settle: Duration) -> anyhow::Result<String> {
    browser.navigate(url).await?;
    browser.wait_for_body(DOM_READY_TIMEOUT).await?;
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }
    browser.page_source().await
}

#[async_trait]
impl<B: Browser> PageExtractor for BrowserExtractor<B> {
    async fn extract_page(&mut self, url: &str, settle: Duration) -> Option<ExtractedPage> {
        self.load(url, settle).await
    }

    async fn close(&mut self) -> Result<()> {
        BrowserExtractor::close(self).await
    }
}

impl<B: Browser> Drop for BrowserExtractor<B> {
    fn drop(&mut self) {
        if self.browser.is_some() {
            tracing::warn!(target: "web.extract", "extract.extractor.dropped_without_close");
        }
    }
}
