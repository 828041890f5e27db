//! Full-screen terminal interface built on Ratatui.
//!
//! # Layout
//! Title, word card (meaning and pronunciation), answer slots, tile pool,
//! status panel, word counter and key help, top to bottom.
//!
//! # Keys
//! - `1`-`8`: place the tile with that number (words never exceed eight tiles)
//! - `Left`/`Right`: move the slot cursor, `Delete`: clear the slot under it
//! - `Backspace`: clear the last filled slot
//! - `Enter`/`n`: next word, `g`: generate more words, `s`: hear the word
//! - `Esc`/`q`: quit

use crate::game_state::{GameInterface, UserAction};
use crate::round::{POOL_SIZE, RoundEngine, RoundStatus};
use crate::session::{Announcer, Session, Tone};
use crate::{debug_log, error_log, info_log, warn_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const SPEECH_PROGRAM: &str = "espeak-ng";

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);
const HINT_STYLE: Style = Style::new().fg(Color::Gray);
const TILE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Blue);
const USED_TILE_STYLE: Style = Style::new().fg(Color::DarkGray).bg(Color::Black);
const SLOT_STYLE: Style = Style::new().fg(Color::White).bg(Color::DarkGray);
const SELECTED_SLOT_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::White)
    .add_modifier(Modifier::BOLD);
const CORRECT_SLOT_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Green)
    .add_modifier(Modifier::BOLD);
const INCORRECT_SLOT_STYLE: Style = Style::new()
    .fg(Color::White)
    .bg(Color::Red)
    .add_modifier(Modifier::BOLD);
const REVEALED_SLOT_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Yellow)
    .add_modifier(Modifier::BOLD);

/// Everything the frame needs, borrowed for one draw.
struct RenderContext<'a> {
    session: &'a Session,
    selected: usize,
}

/// What the key handler remembers from the last frame.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct BoardView {
    filled: Vec<bool>,
    selected: usize,
}

impl BoardView {
    fn sync(&mut self, round: Option<&RoundEngine>) {
        self.filled = round
            .map(|round| round.slots().iter().map(Option::is_some).collect())
            .unwrap_or_default();
        self.selected = self.selected.min(self.filled.len().saturating_sub(1));
    }

    fn move_left(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn move_right(&mut self) {
        if self.selected + 1 < self.filled.len() {
            self.selected += 1;
        }
    }

    fn last_filled(&self) -> Option<usize> {
        self.filled.iter().rposition(|filled| *filled)
    }
}

/// Translate one key press into a game action.
fn key_action(key: KeyEvent, view: &mut BoardView) -> Option<UserAction> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
            .then_some(UserAction::Exit);
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(UserAction::Exit),
        KeyCode::Char(c @ '1'..='8') => {
            let index = c.to_digit(10)? as usize - 1;
            (index < POOL_SIZE).then_some(UserAction::Place(index))
        }
        KeyCode::Left => {
            view.move_left();
            None
        }
        KeyCode::Right => {
            view.move_right();
            None
        }
        KeyCode::Delete => Some(UserAction::Remove(view.selected)),
        KeyCode::Backspace => view.last_filled().map(UserAction::Remove),
        KeyCode::Enter | KeyCode::Char('n' | 'N') => Some(UserAction::Next),
        KeyCode::Char('g' | 'G') => Some(UserAction::MoreWords),
        KeyCode::Char('s' | 'S') => Some(UserAction::Speak),
        _ => None,
    }
}

/// Main TUI interface component.
///
/// Owns the terminal for its lifetime and restores it on drop.
pub struct TuiInterface<B: Backend = CrosstermBackend<io::Stdout>> {
    terminal: Terminal<B>,
    view: BoardView,
    owns_terminal: bool,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("TuiInterface::new() - terminal ready");

        Ok(Self {
            terminal,
            view: BoardView::default(),
            owns_terminal: true,
        })
    }
}

impl<B: Backend> TuiInterface<B> {
    /// Draw onto an existing backend without touching terminal modes.
    pub fn with_backend(backend: B) -> Result<Self, io::Error> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            view: BoardView::default(),
            owns_terminal: false,
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        if !self.owns_terminal {
            return Ok(());
        }
        self.owns_terminal = false;
        disable_raw_mode()?;
        execute!(io::stdout(), LeaveAlternateScreen, cursor::Show)?;
        Ok(())
    }

    fn draw(&mut self, session: &Session) -> Result<(), io::Error> {
        let ctx = RenderContext {
            session,
            selected: self.view.selected,
        };
        self.terminal.draw(|f| {
            render_static(f, &ctx);
        })?;
        Ok(())
    }

    /// Log and handle draw errors appropriately
    fn draw_or_log(&mut self, session: &Session) {
        if let Err(e) = self.draw(session) {
            debug_log!("Draw error: {}", e);
        }
    }

    fn handle_input(&mut self, wait: Duration) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(wait)? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) => {
                // Only process Press events, ignore Release and Repeat to avoid double input
                if key.kind != KeyEventKind::Press {
                    return Ok(None);
                }
                debug_log!(
                    "handle_input() - Key event received: code={:?}, modifiers={:?}",
                    key.code,
                    key.modifiers
                );
                Ok(key_action(key, &mut self.view))
            }
            other => {
                debug_log!("handle_input() - Ignoring event {:?}", other);
                Ok(None)
            }
        }
    }
}

impl<B: Backend> GameInterface for TuiInterface<B> {
    fn render(&mut self, session: &Session) {
        self.view.sync(session.round());
        self.draw_or_log(session);
    }

    fn next_action(&mut self, wait: Duration) -> Option<UserAction> {
        match self.handle_input(wait) {
            Ok(action) => action,
            Err(e) => {
                error_log!("terminal input failed: {e}");
                Some(UserAction::Exit)
            }
        }
    }
}

impl<B: Backend> Drop for TuiInterface<B> {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Render the complete UI layout using the provided context.
fn render_static(f: &mut Frame, ctx: &RenderContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(4), // Word card
            Constraint::Length(3), // Answer slots
            Constraint::Length(3), // Tile pool
            Constraint::Min(3),    // Status
            Constraint::Length(3), // Word counter
            Constraint::Length(3), // Instructions
        ])
        .split(f.area());

    render_title(f, chunks[0], ctx.session);
    match ctx.session.current_word().zip(ctx.session.round()) {
        Some((word, round)) => {
            render_word_card(f, chunks[1], &word.english, &word.transliteration);
            render_slots(f, chunks[2], round, ctx.selected);
            render_tiles(f, chunks[3], round);
        }
        None => render_empty(f, chunks[1]),
    }
    render_status(f, chunks[4], ctx.session);
    render_footer(f, chunks[5], ctx.session);
    render_instructions(f, chunks[6], ctx.session);
}

fn render_title(f: &mut Frame, area: Rect, session: &Session) {
    let board = session.scoreboard();
    let line = Line::from(vec![
        Span::styled("HINDI WORD MASTER", HEADER_STYLE),
        Span::raw("   "),
        Span::styled(format!("Score: {}", board.score), INFO_STYLE),
        Span::raw("  "),
        Span::styled(format!("Streak: {}", board.streak), SUCCESS_STYLE),
    ]);
    let title = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn render_word_card(f: &mut Frame, area: Rect, english: &str, transliteration: &str) {
    let lines = vec![
        Line::from(Span::styled(english.to_string(), HEADER_STYLE)),
        Line::from(Span::styled(format!("\"{transliteration}\""), HINT_STYLE)),
    ];
    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().title("Meaning").borders(Borders::ALL));
    f.render_widget(card, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let card = Paragraph::new("No words to play. Press G to generate some.")
        .style(ERROR_STYLE)
        .block(Block::default().title("Meaning").borders(Borders::ALL));
    f.render_widget(card, area);
}

fn slot_style(status: RoundStatus, selected: bool) -> Style {
    match status {
        RoundStatus::Correct => CORRECT_SLOT_STYLE,
        RoundStatus::Incorrect => INCORRECT_SLOT_STYLE,
        RoundStatus::Revealed => REVEALED_SLOT_STYLE,
        RoundStatus::Idle if selected => SELECTED_SLOT_STYLE,
        RoundStatus::Idle => SLOT_STYLE,
    }
}

fn render_slots(f: &mut Frame, area: Rect, round: &RoundEngine, selected: usize) {
    let mut spans = Vec::new();
    for (i, slot) in round.slots().iter().enumerate() {
        let style = slot_style(round.status(), i == selected);
        spans.push(Span::styled(format!(" {} ", slot.unwrap_or("_")), style));
        spans.push(Span::raw(" "));
    }
    let slots = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().title("Answer").borders(Borders::ALL));
    f.render_widget(slots, area);
}

fn render_tiles(f: &mut Frame, area: Rect, round: &RoundEngine) {
    let spans: Vec<Span> = if round.status().is_terminal() {
        vec![Span::styled("Press ENTER for the next word", HINT_STYLE)]
    } else {
        round
            .tiles()
            .iter()
            .enumerate()
            .flat_map(|(i, tile)| {
                let style = if tile.used { USED_TILE_STYLE } else { TILE_STYLE };
                [
                    Span::styled(format!(" {}:{} ", i + 1, tile.glyph), style),
                    Span::raw(" "),
                ]
            })
            .collect()
    };
    let tiles = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(Block::default().title("Tiles").borders(Borders::ALL));
    f.render_widget(tiles, area);
}

fn render_status(f: &mut Frame, area: Rect, session: &Session) {
    let mut lines = Vec::new();
    if let Some(round) = session.round() {
        let line = match round.status() {
            RoundStatus::Idle if round.is_full() => Some(Span::styled("Checking...", MESSAGE_STYLE)),
            RoundStatus::Idle => None,
            RoundStatus::Correct => Some(Span::styled("Correct! Great Job!", SUCCESS_STYLE)),
            RoundStatus::Incorrect => Some(Span::styled(
                format!("Try Again! {} tries left.", round.tries_left()),
                ERROR_STYLE,
            )),
            RoundStatus::Revealed => Some(Span::styled("Here is the answer", INFO_STYLE)),
        };
        lines.extend(line.map(Line::from));
    }
    if session.awaiting_batch() {
        lines.push(Line::from(Span::styled("Generating new words...", INFO_STYLE)));
    } else if session.is_loading() {
        lines.push(Line::from(Span::styled(
            "Creating more words in the background...",
            MESSAGE_STYLE,
        )));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Status").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame, area: Rect, session: &Session) {
    let supply = session.supply();
    let text = if supply.is_empty() {
        "No words loaded".to_string()
    } else {
        format!("Word {} of {}", supply.cursor() + 1, supply.len())
    };
    let footer = Paragraph::new(text)
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}

fn render_instructions(f: &mut Frame, area: Rect, session: &Session) {
    let text = if session.supply().generation_enabled() {
        "1-8: Place | ←/→ DEL: Clear slot | BKSP: Undo | ENTER: Next | G: More words | S: Speak | ESC: Quit"
    } else {
        "1-8: Place | ←/→ DEL: Clear slot | BKSP: Undo | ENTER: Next | S: Speak | ESC: Quit"
    };
    let paragraph = Paragraph::new(text)
        .style(HINT_STYLE)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

/// Sounds through the terminal bell and speech through `espeak-ng`.
#[derive(Debug, Default)]
pub struct TerminalAnnouncer;

impl Announcer for TerminalAnnouncer {
    fn play_tone(&mut self, tone: Tone) {
        let bells: &[u8] = match tone {
            Tone::Correct => b"\x07",
            Tone::Incorrect => b"\x07\x07",
        };
        let mut stdout = io::stdout();
        let _ = stdout.write_all(bells);
        let _ = stdout.flush();
    }

    fn speak(&mut self, text: &str, locale: &str) {
        let voice = locale.split('-').next().unwrap_or(locale);
        let mut command = Command::new(SPEECH_PROGRAM);
        command.args(["-v", voice, text]);
        if let Err(e) = run_detached(command) {
            warn_log!("speech unavailable ({SPEECH_PROGRAM}): {e}");
        }
    }
}

/// Start `command` with no terminal I/O and reap it on a background thread.
fn run_detached(mut command: Command) -> io::Result<JoinHandle<io::Result<ExitStatus>>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(thread::spawn(move || child.wait()))
}
