use crate::styles;
use ratatui::style::Style;
use skimmer_common::LlmProvider;
use skimmer_pipeline::{Digest, PipelineEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptLine {
    pub text: String,
    pub style: Style,
}

impl TranscriptLine {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn blank() -> Self {
        Self::new(String::new(), Style::default())
    }
}

fn indented(text: &str, style: Style) -> impl Iterator<Item = TranscriptLine> + '_ {
    text.lines()
        .map(move |line| TranscriptLine::new(format!("  {line}"), style))
}

pub fn user_block(prompt: &str) -> Vec<TranscriptLine> {
    let mut out = vec![TranscriptLine::new("→ [You]", styles::user_header())];
    out.extend(indented(prompt, styles::user_text()));
    out.push(TranscriptLine::blank());
    out
}

/// Summary plus a footer naming the query and how many pages were read.
pub fn assistant_block(provider: LlmProvider, digest: &Digest) -> Vec<TranscriptLine> {
    let mut out = vec![TranscriptLine::new(
        format!("← [Skimmer · {provider}]"),
        styles::assistant_header(),
    )];
    out.extend(indented(&digest.summary, styles::assistant_text()));
    out.push(TranscriptLine::new(
        format!("  ({}; query '{}')", digest.coverage(), digest.query),
        styles::dim(),
    ));
    out.push(TranscriptLine::blank());
    out
}

pub fn progress_line(event: &PipelineEvent) -> TranscriptLine {
    TranscriptLine::new(format!("  · {event}"), styles::progress())
}

pub fn error_block(message: &str) -> Vec<TranscriptLine> {
    vec![
        TranscriptLine::new(format!("Error: {message}"), styles::error()),
        TranscriptLine::blank(),
    ]
}

pub fn help_block() -> Vec<TranscriptLine> {
    let mut out = vec![TranscriptLine::new("Commands:", styles::label())];
    for row in [
        "  /provider <ollama|openai>  switch provider (starts a fresh conversation)",
        "  /provider                  show the active provider",
        "  /new                       start a fresh conversation",
        "  /help                      show this help",
        "  /quit                      exit",
    ] {
        out.push(TranscriptLine::new(row, styles::value()));
    }
    out.push(TranscriptLine::blank());
    out
}

pub fn welcome(provider: LlmProvider) -> TranscriptLine {
    TranscriptLine::new(
        format!("Ask anything; answers are drawn from the web. Provider: {provider}. Type /help for commands."),
        styles::system(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[TranscriptLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn user_prompt_is_indented_under_header() {
        let lines = user_block("first\nsecond");
        assert_eq!(texts(&lines), vec!["→ [You]", "  first", "  second", ""]);
    }

    #[test]
    fn assistant_footer_reports_coverage_and_query() {
        let digest = Digest {
            query: "storm coast".into(),
            search_attempts: 1,
            outcomes: Vec::new(),
            content: String::new(),
            summary: "Winds are high.".into(),
            conversation: None,
        };
        let lines = assistant_block(LlmProvider::OpenAi, &digest);
        assert_eq!(
            texts(&lines),
            vec![
                "← [Skimmer · openai]",
                "  Winds are high.",
                "  (0 of 0 pages read; query 'storm coast')",
                "",
            ]
        );
    }

    #[test]
    fn errors_are_prefixed() {
        let lines = error_block("no results after 3 search attempts");
        assert_eq!(lines[0].text, "Error: no results after 3 search attempts");
        assert_eq!(lines[0].style, styles::error());
    }

    #[test]
    fn progress_uses_event_text() {
        let line = progress_line(&PipelineEvent::SearchCompleted {
            attempt: 1,
            results: 3,
        });
        assert_eq!(line.text, "  · Found 3 result(s)");
    }
}
