use anyhow::{Result, anyhow};
use async_trait::async_trait;
use skimmer_web::{Browser, BrowserExtractor, Extraction, OutputFormat, PageExtractor};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Default)]
struct Counters {
    navigations: AtomicUsize,
    closes: AtomicUsize,
}

struct FakeBrowser {
    html: String,
    fail_url: Option<&'static str>,
    counters: Arc<Counters>,
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        if self.fail_url == Some(url) {
            return Err(anyhow!("net::ERR_NAME_NOT_RESOLVED"));
        }
        Ok(())
    }

    async fn wait_for_body(&mut self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        Ok(self.html.clone())
    }

    async fn close(&mut self) -> Result<()> {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn extractor(html: &str, fail_url: Option<&'static str>) -> (BrowserExtractor<FakeBrowser>, Arc<Counters>) {
    let counters = Arc::new(Counters::default());
    let browser = FakeBrowser {
        html: html.to_string(),
        fail_url,
        counters: counters.clone(),
    };
    (BrowserExtractor::new(browser), counters)
}

const PAGE: &str = "<html><head><title>A</title></head><body><p>Hello world.</p></body></html>";

#[tokio::test]
async fn close_releases_exactly_once_and_blocks_further_extraction() {
    let (mut ex, counters) = extractor(PAGE, None);

    assert!(ex.extract("http://x", OutputFormat::Structured, Duration::ZERO).await.is_some());

    ex.close().await.unwrap();
    ex.close().await.unwrap();
    assert_eq!(counters.closes.load(Ordering::SeqCst), 1);
    assert!(ex.is_closed());

    let before = counters.navigations.load(Ordering::SeqCst);
    assert!(ex.extract("http://x", OutputFormat::Text, Duration::ZERO).await.is_none());
    assert_eq!(counters.navigations.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn navigation_failure_is_none_and_session_stays_usable() {
    let (mut ex, _counters) = extractor(PAGE, Some("http://broken"));

    assert!(ex.extract_page("http://broken", Duration::ZERO).await.is_none());
    let page = ex.extract_page("http://x", Duration::ZERO).await.unwrap();
    assert_eq!(page.paragraphs, vec!["Hello world."]);

    PageExtractor::close(&mut ex).await.unwrap();
}

#[tokio::test]
async fn text_and_structured_modes_share_one_extraction() {
    let (mut ex, _counters) = extractor(PAGE, None);

    let text = ex.extract("http://x", OutputFormat::Text, Duration::ZERO).await;
    assert_eq!(
        text,
        Some(Extraction::Text(vec![
            "Title: A".to_string(),
            "\nParagraphs:".to_string(),
            "Hello world.".to_string(),
        ]))
    );

    let first = ex.extract("http://x", OutputFormat::Structured, Duration::from_millis(5)).await;
    let second = ex.extract("http://x", OutputFormat::Structured, Duration::from_millis(5)).await;
    let (Some(Extraction::Structured(a)), Some(Extraction::Structured(b))) = (first, second) else {
        panic!("expected structured extractions");
    };
    assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());

    ex.close().await.unwrap();
}
