use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Mode};
use skimmer_common::observability::{LogConfig, init_logging};
use skimmer_config::{DEFAULT_CONFIG_FILE, SkimmerConfig, SkimmerConfigLoader, load_dotenv};
use skimmer_pipeline::prompts::chat_summary_instructions;
use std::path::Path;
use std::sync::Arc;

mod cli;
mod factory;
mod run;

use factory::AppFactory;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mode = match cli.mode() {
        Ok(mode) => mode,
        Err(msg) => {
            eprintln!("error: {msg}\n\n{}", Cli::command().render_usage());
            std::process::exit(1);
        }
    };

    let dotenv = load_dotenv();
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(n) = cli.results {
        config.pipeline.max_results = n;
    }

    // The chat interface owns the terminal; logs go to the file only.
    let chat = matches!(mode, Mode::Chat { .. });
    let log_path = init_logging(LogConfig {
        emit_stderr: cli.verbose && !chat,
        ..LogConfig::default()
    })?;
    tracing::info!(
        target: "app",
        mode = mode.name(),
        log = %log_path.display(),
        dotenv = ?dotenv,
        "app.start"
    );

    match mode {
        Mode::Digest { provider, query } => {
            let factory = AppFactory::new(config, None);
            run::digest(&factory, provider, &query).await
        }
        Mode::Scrape { url, format, wait } => run::scrape(&config, &url, format, wait).await,
        Mode::Chat { provider } => {
            let factory = AppFactory::new(config, Some(chat_summary_instructions()));
            skimmer_tui::run_chat(Arc::new(factory), provider).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SkimmerConfig> {
    let loader = match path {
        Some(p) => SkimmerConfigLoader::new().with_file(p),
        None => SkimmerConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    Ok(loader.load()?)
}
