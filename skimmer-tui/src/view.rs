use crate::transcript::TranscriptLine;
use anyhow::Result;
use ratatui::{
    Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use skimmer_common::LlmProvider;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

/// Everything one frame needs, borrowed from the app.
pub struct ViewSnap<'a> {
    pub provider: LlmProvider,
    pub input: &'a str,
    pub input_cursor: usize,
    pub lines: &'a [TranscriptLine],
    pub scroll: usize,
    pub busy: bool,
    pub spinner: &'static str,
    pub turns: usize,
}

pub fn draw<B: Backend>(term: &mut Terminal<B>, snap: &ViewSnap<'_>) -> Result<()> {
    term.draw(|frame| {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![Span::styled(
            " Skimmer ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .wrap(Wrap { trim: true });
        frame.render_widget(header, layout[0]);

        let visible_h = layout[1].height.saturating_sub(2) as usize;
        let content_width = layout[1].width.saturating_sub(2) as usize;
        let wrapped = wrap_transcript(snap.lines, content_width);
        let (start, end) = window(wrapped.len(), visible_h, snap.scroll);

        let items: Vec<ListItem> = wrapped[start..end]
            .iter()
            .map(|(text, style)| ListItem::new(Line::from(Span::styled(text.clone(), *style))))
            .collect();
        let body =
            List::new(items).block(Block::default().borders(Borders::ALL).title(" Transcript "));
        frame.render_widget(body, layout[1]);

        let input_box = Paragraph::new(snap.input)
            .block(Block::default().borders(Borders::ALL).title(" Ask "));
        frame.render_widget(Clear, layout[2]);
        frame.render_widget(input_box, layout[2]);

        let caret_x = layout[2].x + 1 + visual_caret_col(snap.input, snap.input_cursor);
        frame.set_cursor_position(Position {
            x: caret_x,
            y: layout[2].y + 1,
        });

        let status_line = Line::from(vec![
            Span::raw(" "),
            Span::styled(snap.spinner, Style::default().fg(Color::Yellow)),
            Span::raw(" "),
            if snap.busy {
                Span::styled("Working…", Style::default().fg(Color::Yellow))
            } else {
                Span::styled("Idle", Style::default().fg(Color::Green))
            },
            Span::raw(format!(" • provider: {} • turns: {}", snap.provider, snap.turns)),
        ]);
        let status = Paragraph::new(status_line)
            .block(Block::default().borders(Borders::ALL).title(" Status "));
        frame.render_widget(status, layout[3]);
    })?;

    Ok(())
}

/// Visible slice of `total` rows, `scroll` rows up from the bottom.
fn window(total: usize, visible: usize, scroll: usize) -> (usize, usize) {
    let scroll = scroll.min(total.saturating_sub(visible));
    let end = total - scroll;
    (end.saturating_sub(visible), end)
}

fn visual_caret_col(input: &str, cursor: usize) -> u16 {
    UnicodeWidthStr::width(&input[..cursor]) as u16
}

fn wrap_transcript(lines: &[TranscriptLine], width: usize) -> Vec<(String, Style)> {
    let effective_width = width.max(1);
    let mut out = Vec::new();

    for entry in lines {
        let style = entry.style;
        for raw_line in entry.text.split('\n') {
            let segments = wrap(raw_line, effective_width);
            if segments.is_empty() {
                out.push((String::new(), style));
            } else {
                out.extend(segments.into_iter().map(|seg| (seg.into_owned(), style)));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn row(term: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = term.backend().buffer();
        (0..buffer.area().width)
            .map(|x| buffer.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
            .collect()
    }

    #[test]
    fn window_clamps_scroll() {
        assert_eq!(window(10, 4, 0), (6, 10));
        assert_eq!(window(10, 4, 3), (3, 7));
        assert_eq!(window(10, 4, 99), (0, 4));
        assert_eq!(window(2, 4, 5), (0, 2));
    }

    #[test]
    fn long_lines_wrap_to_width() {
        let lines = [TranscriptLine::new("alpha beta gamma", Style::default())];
        let wrapped = wrap_transcript(&lines, 11);
        let texts: Vec<&str> = wrapped.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn frame_shows_transcript_and_status() {
        let mut term = Terminal::new(TestBackend::new(60, 12)).unwrap();
        let lines = [TranscriptLine::new("→ [You]", Style::default())];
        let snap = ViewSnap {
            provider: LlmProvider::OpenAi,
            input: "hello",
            input_cursor: 5,
            lines: &lines,
            scroll: 0,
            busy: true,
            spinner: "⠋",
            turns: 2,
        };
        draw(&mut term, &snap).unwrap();

        assert!(row(&term, 0).contains("Skimmer"));
        let screen: String = (0..12).map(|y| row(&term, y)).collect::<Vec<_>>().join("\n");
        assert!(screen.contains("→ [You]"));
        assert!(screen.contains("hello"));
        assert!(screen.contains("Working…"));
        assert!(screen.contains("provider: openai"));
        assert!(screen.contains("turns: 2"));
    }
}
