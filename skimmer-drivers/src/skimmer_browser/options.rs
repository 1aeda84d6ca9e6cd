use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const DEFAULT_WEBDRIVER_PORT: u16 = 9515;

/// The `browser` config section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// WebDriver endpoint to connect to.
    pub webdriver_url: String,
    /// Show a visible window instead of running headless.
    pub show_browser: bool,
    /// When set, this chromedriver binary is spawned on the endpoint's port
    /// and killed when the session ends.
    pub chromedriver_path: Option<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            show_browser: false,
            chromedriver_path: None,
        }
    }
}

impl BrowserSettings {
    pub fn headless(&self) -> bool {
        !self.show_browser
    }

    /// Port of the WebDriver endpoint, defaulting to chromedriver's 9515.
    pub fn webdriver_port(&self) -> anyhow::Result<u16> {
        let url = Url::parse(&self.webdriver_url)
            .map_err(|e| anyhow::anyhow!("invalid webdriver url {}: {e}", self.webdriver_url))?;
        Ok(url.port().unwrap_or(DEFAULT_WEBDRIVER_PORT))
    }
}

/// Chrome command-line arguments for a session.
pub fn chrome_arguments(headless: bool) -> Vec<String> {
    let mut args = vec![
        "--log-level=3".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
    ];
    if headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}
