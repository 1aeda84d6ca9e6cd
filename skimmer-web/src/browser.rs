use anyhow::Result;
use async_trait::async_trait;
use skimmer_drivers::skimmer_browser::driver::SkimmerDriver;
use std::time::Duration;

/// The browser operations page extraction needs.
#[async_trait]
pub trait Browser: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Block until a `body` element is present or `timeout` elapses.
    async fn wait_for_body(&mut self, timeout: Duration) -> Result<()>;

    async fn page_source(&mut self) -> Result<String>;

    /// Release the session and any process behind it.
    async fn close(&mut self) -> Result<()>;
}

/// Concrete browser backed by the fantoccini driver.
#[async_trait]
impl Browser for SkimmerDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.goto(url).await
    }

    async fn wait_for_body(&mut self, timeout: Duration) -> Result<()> {
        SkimmerDriver::wait_for_body(self, timeout).await
    }

    async fn page_source(&mut self) -> Result<String> {
        SkimmerDriver::page_source(self).await
    }

    async fn close(&mut self) -> Result<()> {
        SkimmerDriver::close(self).await
    }
}
