use anyhow::{Context, Result, bail};
use crossterm::style::{StyledContent, Stylize};
use skimmer_common::LlmProvider;
use skimmer_config::SkimmerConfig;
use skimmer_pipeline::{Digest, DigestRequest, PipelineEvent, PipelineFactory};
use skimmer_web::{BrowserExtractor, Extraction, OutputFormat};
use std::time::Duration;
use tokio::sync::mpsc;

/// One-shot digest: progress to stderr, summary to stdout.
pub async fn digest(factory: &dyn PipelineFactory, provider: LlmProvider, query: &str) -> Result<()> {
    let pipeline = factory.pipeline(provider).await?;
    let mut extractor = factory.extractor().await?;

    let (tx, mut rx) = mpsc::unbounded_channel::<PipelineEvent>();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            eprintln!("{}", progress_line(&event));
        }
    });

    let result = pipeline
        .run(&DigestRequest::literal(query), &mut *extractor, Some(&tx))
        .await;
    if let Err(e) = extractor.close().await {
        tracing::warn!(target: "app", error = %e, "app.extractor.close_failed");
    }
    drop(tx);
    let _ = printer.await;

    let digest = result?;
    println!("{}", digest.summary.trim());
    eprintln!("{}", footer(&digest).dim());
    Ok(())
}

fn progress_line(event: &PipelineEvent) -> StyledContent<String> {
    let text = event.to_string();
    match event {
        PipelineEvent::QueryChosen { .. } => text.cyan(),
        PipelineEvent::SearchCompleted { .. } | PipelineEvent::PageRead { .. } => text.dim(),
        PipelineEvent::Reading { .. } => text.green(),
        PipelineEvent::PageFailed { .. } => text.yellow(),
        PipelineEvent::Summarizing { .. } => text.magenta(),
    }
}

fn footer(digest: &Digest) -> String {
    format!(
        "{} for '{}' after {} search attempt(s)",
        digest.coverage(),
        digest.query,
        digest.search_attempts
    )
}

/// Extract one page and print it as JSON or one line per entry.
pub async fn scrape(
    config: &SkimmerConfig,
    url: &str,
    format: OutputFormat,
    wait: Option<Duration>,
) -> Result<()> {
    let settle = wait.unwrap_or_else(|| config.pipeline.settle_delay());
    let mut extractor = BrowserExtractor::launch(&config.browser).await?;
    let extraction = extractor.extract(url, format, settle).await;
    extractor.close().await?;

    match extraction {
        Some(Extraction::Structured(page)) => {
            println!("{}", page.to_json().context("serializing page")?);
        }
        Some(Extraction::Text(lines)) => {
            for line in lines {
                println!("{line}");
            }
        }
        None => bail!("could not extract content from {url}"),
    }
    Ok(())
}
