use crate::{
    command::{Command, parse_command},
    input::InputLine,
    session::ChatSession,
    styles,
    transcript::{self, TranscriptLine},
    turn::{TurnOutcome, TurnRequest, run_turn},
    view::{self, ViewSnap},
};
use anyhow::Result;
use crossterm::{
    event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use skimmer_common::LlmProvider;
use skimmer_pipeline::{PipelineEvent, PipelineFactory};
use std::{
    io::{self, Stdout},
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::mpsc::{self, UnboundedSender},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK_RATE: Duration = Duration::from_millis(80);
const INPUT_POLL: Duration = Duration::from_millis(100);
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Turn messages carry the id of the turn that sent them.
pub(crate) enum TuiMsg {
    InputEvent(CtEvent),
    Tick,
    Progress { turn: u64, event: PipelineEvent },
    TurnDone { turn: u64, outcome: TurnOutcome },
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Raw mode plus alternate screen, undone on drop.
struct TerminalGuard {
    term: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut term = Terminal::new(CrosstermBackend::new(stdout))?;
        term.clear()?;
        Ok(Self { term })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        let _ = execute!(self.term.backend_mut(), LeaveAlternateScreen);
        let _ = self.term.show_cursor();
    }
}

/// Run the chat interface until the user quits.
pub async fn run_chat(factory: Arc<dyn PipelineFactory>, provider: LlmProvider) -> Result<()> {
    let mut guard = TerminalGuard::enter()?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());
    spawn_ticker(tx.clone());

    let mut app = ChatApp::new(factory, provider, tx);
    tracing::info!(target: "tui", %provider, "chat.start");
    app.render(&mut guard.term)?;

    while let Some(msg) = rx.recv().await {
        if app.handle(msg) == Flow::Quit {
            break;
        }
        if app.dirty {
            app.render(&mut guard.term)?;
        }
    }

    drop(guard);
    app.shutdown().await;
    tracing::info!(target: "tui", turns = app.session.turns().len(), "chat.stop");
    Ok(())
}

/// Blocking key reader on its own thread; exits once the app is gone.
fn spawn_input_reader(tx: UnboundedSender<TuiMsg>) {
    std::thread::spawn(move || {
        loop {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(TuiMsg::InputEvent(ev)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(target: "tui", error = %e, "chat.input.read_failed");
                        break;
                    }
                },
                Ok(false) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(target: "tui", error = %e, "chat.input.poll_failed");
                    break;
                }
            }
        }
    });
}

fn spawn_ticker(tx: UnboundedSender<TuiMsg>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_RATE);
        loop {
            interval.tick().await;
            if tx.send(TuiMsg::Tick).is_err() {
                break;
            }
        }
    });
}

struct RunningTurn {
    id: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct ChatApp {
    factory: Arc<dyn PipelineFactory>,
    session: ChatSession,
    tx: UnboundedSender<TuiMsg>,

    input: InputLine,
    lines: Vec<TranscriptLine>,
    scroll: usize,
    dirty: bool,

    running: Option<RunningTurn>,
    /// Cancelled turns still closing their extractor.
    draining: Vec<JoinHandle<()>>,
    last_turn: u64,
    spin_idx: usize,
}

impl ChatApp {
    fn new(
        factory: Arc<dyn PipelineFactory>,
        provider: LlmProvider,
        tx: UnboundedSender<TuiMsg>,
    ) -> Self {
        Self {
            factory,
            session: ChatSession::new(provider),
            tx,
            input: InputLine::default(),
            lines: vec![transcript::welcome(provider), TranscriptLine::blank()],
            scroll: 0,
            dirty: true,
            running: None,
            draining: Vec::new(),
            last_turn: 0,
            spin_idx: 0,
        }
    }

    fn busy(&self) -> bool {
        self.running.is_some()
    }

    fn is_current(&self, turn: u64) -> bool {
        self.running.as_ref().is_some_and(|r| r.id == turn)
    }

    fn spinner(&self) -> &'static str {
        if self.busy() {
            BRAILLE_FRAMES[self.spin_idx % BRAILLE_FRAMES.len()]
        } else {
            " "
        }
    }

    fn push(&mut self, lines: impl IntoIterator<Item = TranscriptLine>) {
        self.lines.extend(lines);
        self.scroll = 0;
        self.dirty = true;
    }

    fn render(&mut self, term: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let snap = ViewSnap {
            provider: self.session.provider(),
            input: self.input.text(),
            input_cursor: self.input.cursor(),
            lines: &self.lines,
            scroll: self.scroll,
            busy: self.busy(),
            spinner: self.spinner(),
            turns: self.session.turns().len(),
        };
        view::draw(term, &snap)?;
        self.dirty = false;
        Ok(())
    }

    fn handle(&mut self, msg: TuiMsg) -> Flow {
        match msg {
            TuiMsg::InputEvent(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                return self.handle_key(key);
            }
            TuiMsg::InputEvent(CtEvent::Resize(..)) => self.dirty = true,
            TuiMsg::InputEvent(_) => {}
            TuiMsg::Tick => {
                if self.busy() {
                    self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
                    self.dirty = true;
                }
            }
            TuiMsg::Progress { turn, event } => {
                if self.is_current(turn) {
                    self.push([transcript::progress_line(&event)]);
                }
            }
            TuiMsg::TurnDone { turn, outcome } => {
                if self.is_current(turn) {
                    self.running = None;
                    self.finish_turn(outcome);
                } else {
                    tracing::debug!(target: "tui", turn, "chat.turn.stale_result");
                }
            }
        }
        Flow::Continue
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => return Flow::Quit,
            (KeyCode::PageUp, _) => self.scroll = self.scroll.saturating_add(5),
            (KeyCode::PageDown, _) => self.scroll = self.scroll.saturating_sub(5),
            (KeyCode::Up, _) => self.scroll = self.scroll.saturating_add(1),
            (KeyCode::Down, _) => self.scroll = self.scroll.saturating_sub(1),
            (KeyCode::Enter, _) => {
                let line = self.input.take();
                self.dirty = true;
                return self.submit(&line);
            }
            (KeyCode::Left, _) => self.input.left(),
            (KeyCode::Right, _) => self.input.right(),
            (KeyCode::Home, _) => self.input.home(),
            (KeyCode::End, _) => self.input.end(),
            (KeyCode::Backspace, _) => self.input.backspace(),
            (KeyCode::Delete, _) => self.input.delete(),
            (KeyCode::Esc, _) => self.input.clear(),
            (KeyCode::Char(ch), _) => self.input.insert(ch),
            _ => return Flow::Continue,
        }
        self.dirty = true;
        Flow::Continue
    }

    fn submit(&mut self, line: &str) -> Flow {
        let text = line.trim();
        if text.is_empty() {
            return Flow::Continue;
        }
        if text.starts_with('/') {
            return self.handle_command(parse_command(text));
        }
        if self.busy() {
            self.push([TranscriptLine::new(
                "Still working on the previous question.",
                styles::dim(),
            )]);
            return Flow::Continue;
        }

        self.push(transcript::user_block(text));
        self.session.record_user(text);
        self.start_turn(text.to_string());
        Flow::Continue
    }

    fn start_turn(&mut self, prompt: String) {
        let request = TurnRequest {
            provider: self.session.provider(),
            prompt,
            conversation: self.session.conversation().cloned(),
            pipeline: self.session.pipeline(),
            cancel: CancellationToken::new(),
        };
        self.last_turn += 1;
        let id = self.last_turn;
        let cancel = request.cancel.clone();
        let factory = self.factory.clone();
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
            let forward = tx.clone();
            let forwarder = tokio::spawn(async move {
                while let Some(event) = progress_rx.recv().await {
                    if forward.send(TuiMsg::Progress { turn: id, event }).is_err() {
                        break;
                    }
                }
            });

            let outcome = run_turn(factory.as_ref(), request, Some(&progress_tx)).await;
            drop(progress_tx);
            let _ = forwarder.await;
            let _ = tx.send(TuiMsg::TurnDone { turn: id, outcome });
        });
        self.running = Some(RunningTurn { id, cancel, task });
        self.dirty = true;
    }

    fn finish_turn(&mut self, outcome: TurnOutcome) {
        let TurnOutcome {
            provider,
            pipeline,
            result,
        } = outcome;

        let Some(result) = result else {
            return;
        };
        match (result, pipeline) {
            (Ok(digest), Some(pipeline)) => {
                self.push(transcript::assistant_block(provider, &digest));
                self.session.record_assistant(
                    provider,
                    digest.summary,
                    digest.conversation,
                    pipeline,
                );
            }
            (Ok(_), None) => {}
            (Err(e), pipeline) => {
                tracing::warn!(target: "tui", %provider, error = %e, "chat.turn.failed");
                if let Some(p) = pipeline {
                    self.session.adopt_pipeline(provider, p);
                }
                self.push(transcript::error_block(&e.to_string()));
            }
        }
    }

    fn handle_command(&mut self, cmd: Command) -> Flow {
        match cmd {
            Command::Quit => return Flow::Quit,
            Command::Help => self.push(transcript::help_block()),
            Command::Provider(None) => self.push([
                TranscriptLine::new(
                    format!("Provider: {}", self.session.provider()),
                    styles::label(),
                ),
                TranscriptLine::blank(),
            ]),
            Command::Provider(Some(provider)) => {
                let line = if self.session.switch_provider(provider) {
                    tracing::info!(target: "tui", %provider, "chat.provider.switched");
                    format!("✓ Switched to {provider}; the next question starts a fresh conversation.")
                } else {
                    format!("Already using {provider}.")
                };
                self.push([
                    TranscriptLine::new(line, styles::system()),
                    TranscriptLine::blank(),
                ]);
            }
            Command::BadProvider(name) => self.push(transcript::error_block(&format!(
                "unknown provider '{name}', expected one of: {}",
                LlmProvider::ALL.map(|p| p.as_str()).join(", ")
            ))),
            Command::New => {
                self.abandon();
                self.session.reset();
                self.lines = vec![
                    transcript::welcome(self.session.provider()),
                    TranscriptLine::blank(),
                    TranscriptLine::new("✓ Started a new conversation.", styles::system()),
                    TranscriptLine::blank(),
                ];
                self.scroll = 0;
                self.dirty = true;
            }
            Command::Unknown(s) => self.push([
                TranscriptLine::new(format!("× Unknown command: {s}"), styles::error()),
                TranscriptLine::new("Try `/help`.", styles::dim()),
                TranscriptLine::blank(),
            ]),
        }
        Flow::Continue
    }

    /// Cancel an in-flight turn; its result is never shown.
    fn abandon(&mut self) {
        self.draining.retain(|task| !task.is_finished());
        if let Some(turn) = self.running.take() {
            tracing::info!(target: "tui", turn = turn.id, "chat.turn.abandoned");
            turn.cancel.cancel();
            self.draining.push(turn.task);
        }
    }

    /// Cancel the current turn and wait for every cancelled turn to close
    /// its extractor.
    async fn shutdown(&mut self) {
        self.abandon();
        for task in self.draining.drain(..) {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!(target: "tui", error = %e, "chat.turn.join_failed"),
                Err(_) => tracing::warn!(target: "tui", "chat.turn.shutdown_timed_out"),
            }
        }
    }
}
