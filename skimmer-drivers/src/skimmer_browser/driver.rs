use crate::skimmer_browser::{
    options::{chrome_arguments, BrowserSettings},
    process::ChromedriverProcess,
};
use anyhow::{anyhow, Result};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use std::time::Duration;
use webdriver::capabilities::Capabilities;

/// Thin wrapper around a `fantoccini` WebDriver client, plus the chromedriver
/// child when this driver spawned one.
pub struct SkimmerDriver {
    client: Option<Client>,
    chromedriver: Option<ChromedriverProcess>,
}

impl SkimmerDriver {
    /// Open a browser session.
    ///
    /// Connects to `settings.webdriver_url` (default `http://localhost:9515`),
    /// spawning `settings.chromedriver_path` on that port first when set.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut chromedriver = match settings.chromedriver_path.as_deref() {
            Some(path) => Some(ChromedriverProcess::spawn(path, settings.webdriver_port()?).await?),
            None => None,
        };

        let mut caps = Capabilities::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": chrome_arguments(settings.headless()) }),
        );

        let connected = ClientBuilder::native()
            .capabilities(caps)
            .connect(&settings.webdriver_url)
            .await;
        let client = match connected {
            Ok(client) => client,
            Err(e) => {
                if let Some(process) = chromedriver.as_mut() {
                    process.shutdown().await;
                }
                return Err(anyhow!(
                    "could not start a browser session at {}: {e}",
                    settings.webdriver_url
                ));
            }
        };

        tracing::info!(
            target: "browser",
            webdriver_url = %settings.webdriver_url,
            headless = settings.headless(),
            spawned = chromedriver.is_some(),
            "browser.session.open"
        );

        Ok(Self {
            client: Some(client),
            chromedriver,
        })
    }

    fn client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| anyhow!("browser session is closed"))
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client()?.goto(url).await?;
        Ok(())
    }

    /// Block until a `body` element exists or `timeout` elapses.
    pub async fn wait_for_body(&self, timeout: Duration) -> Result<()> {
        self.client()?
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css("body"))
            .await?;
        Ok(())
    }

    /// Return the full page HTML source.
    pub async fn page_source(&self) -> Result<String> {
        Ok(self.client()?.source().await?)
    }

    /// End the WebDriver session and stop a spawned chromedriver.
    ///
    /// Safe to call more than once.
    pub async fn close(&mut self) -> Result<()> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        let closed = client.close().await;
        if let Some(mut process) = self.chromedriver.take() {
            process.shutdown().await;
        }
        tracing::info!(target: "browser", ok = closed.is_ok(), "browser.session.closed");
        closed.map_err(|e| anyhow!("failed to close browser session: {e}"))
    }
}
