use clap::Parser;
use skimmer_common::LlmProvider;
use skimmer_web::OutputFormat;
use std::path::PathBuf;
use std::time::Duration;

/// Search the web and summarize the top results.
#[derive(Debug, Parser)]
#[command(name = "skimmer", version)]
pub struct Cli {
    /// LLM provider: ollama or openai.
    #[arg(short, long, value_name = "PROVIDER")]
    pub provider: Option<LlmProvider>,

    /// Search query words.
    #[arg(value_name = "QUERY")]
    pub query: Vec<String>,

    /// Open the interactive chat interface.
    #[arg(long, conflicts_with_all = ["scrape", "query"])]
    pub chat: bool,

    /// Extract a single page and print it.
    #[arg(long, value_name = "URL", conflicts_with = "query")]
    pub scrape: Option<String>,

    /// Scrape output: text or json.
    #[arg(long, value_name = "FORMAT", default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Seconds to wait after the page is ready (scrape mode).
    #[arg(long, value_name = "SECS", requires = "scrape")]
    pub wait: Option<f64>,

    /// Number of top results to read.
    #[arg(short = 'n', long = "results", value_name = "N")]
    pub results: Option<usize>,

    /// YAML config file (default: ./skimmer.yaml when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Mirror logs to stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Digest {
        provider: LlmProvider,
        query: String,
    },
    Chat {
        provider: LlmProvider,
    },
    Scrape {
        url: String,
        format: OutputFormat,
        /// `None` means the configured settle delay.
        wait: Option<Duration>,
    },
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Digest { .. } => "digest",
            Mode::Chat { .. } => "chat",
            Mode::Scrape { .. } => "scrape",
        }
    }
}

impl Cli {
    /// Resolve the run mode; `Err` carries a usage message.
    pub fn mode(&self) -> Result<Mode, String> {
        if self.chat {
            return Ok(Mode::Chat {
                provider: self.provider.unwrap_or_default(),
            });
        }

        if let Some(url) = &self.scrape {
            let url = url.trim();
            if url.is_empty() {
                return Err("--scrape needs a URL".into());
            }
            let wait = self
                .wait
                .map(Duration::try_from_secs_f64)
                .transpose()
                .map_err(|e| format!("invalid --wait: {e}"))?;
            return Ok(Mode::Scrape {
                url: url.to_string(),
                format: self.format,
                wait,
            });
        }

        let provider = self
            .provider
            .ok_or_else(|| "a provider is required: -p <ollama|openai>".to_string())?;
        let query = self.query.join(" ").trim().to_string();
        if query.is_empty() {
            return Err("a search query is required".into());
        }
        Ok(Mode::Digest { provider, query })
    }
}
