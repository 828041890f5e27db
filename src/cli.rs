use crate::game_state::{GameInterface, UserAction};
use crate::generator::{DEFAULT_BATCH_SIZE, DEFAULT_MODEL};
use crate::round::{RoundEngine, RoundStatus};
use crate::session::{Session, Timing};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::time::Duration;

/// Hindi Word Master: rebuild two-letter Hindi words from glyph tiles
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a tab-separated word list (hindi, english, transliteration)
    #[arg(short = 'i', long = "input")]
    pub wordbank_path: Option<String>,

    /// Gemini API key; enables generating new words
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Gemini model used for word generation
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Words requested per generated batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Seed for tile shuffling, for repeatable games
    #[arg(long)]
    pub seed: Option<u64>,

    /// Delay before a full answer is checked, in milliseconds
    #[arg(long, default_value_t = 300)]
    pub check_delay_ms: u64,

    /// How long a wrong answer stays visible, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub retry_delay_ms: u64,

    /// Use the line-oriented interface instead of the full-screen one
    #[arg(long)]
    pub plain: bool,
}

impl Cli {
    /// API key from the command line or `GEMINI_API_KEY`, else the legacy `API_KEY`.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn timing(&self) -> Timing {
        Timing {
            check_delay: Duration::from_millis(self.check_delay_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parse one line of player input.
///
/// Tiles and slots are numbered from 1 on screen.
pub fn parse_command(line: &str) -> Option<UserAction> {
    let input = line.trim().to_lowercase();
    let mut parts = input.split_whitespace();
    let command = parts.next()?;
    let argument = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let index = |arg: Option<&str>| -> Option<usize> {
        arg?.parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(|n| n - 1)
    };

    match (command, argument) {
        ("exit" | "quit" | "q", None) => Some(UserAction::Exit),
        ("next" | "n", None) => Some(UserAction::Next),
        ("more" | "m", None) => Some(UserAction::MoreWords),
        ("say" | "s", None) => Some(UserAction::Speak),
        ("remove" | "r", arg) => index(arg).map(UserAction::Remove),
        (tile, None) => index(Some(tile)).map(UserAction::Place),
        _ => None,
    }
}

fn status_line(round: &RoundEngine) -> String {
    match round.status() {
        RoundStatus::Idle if round.is_full() => "Checking...".to_string(),
        RoundStatus::Idle => String::new(),
        RoundStatus::Correct => "Correct! Great Job!".to_string(),
        RoundStatus::Incorrect => format!("Try Again! {} tries left.", round.tries_left()),
        RoundStatus::Revealed => "Here is the answer".to_string(),
    }
}

/// Text picture of the session, one line per element.
pub fn describe(session: &Session) -> String {
    let mut lines = Vec::new();
    let board = session.scoreboard();
    let supply = session.supply();

    let Some((word, round)) = session.current_word().zip(session.round()) else {
        lines.push("No words to play.".to_string());
        if session.is_loading() {
            lines.push("Generating new words...".to_string());
        }
        return lines.join("\n");
    };

    lines.push(format!(
        "Word {} of {} | Score {} | Streak {}",
        supply.cursor() + 1,
        supply.len(),
        board.score,
        board.streak
    ));
    lines.push(format!("{} (\"{}\")", word.english, word.transliteration));

    let slots: Vec<String> = round
        .slots()
        .iter()
        .map(|slot| format!("[{}]", slot.unwrap_or("_")))
        .collect();
    lines.push(format!("Answer: {}", slots.join(" ")));

    if round.status().is_terminal() {
        lines.push("Type 'next' for the next word.".to_string());
    } else {
        let tiles: Vec<String> = round
            .tiles()
            .iter()
            .enumerate()
            .map(|(i, tile)| {
                if tile.used {
                    format!("{}:({})", i + 1, tile.glyph)
                } else {
                    format!("{}:{}", i + 1, tile.glyph)
                }
            })
            .collect();
        lines.push(format!("Tiles: {}", tiles.join("  ")));
    }

    let status = status_line(round);
    if !status.is_empty() {
        lines.push(status);
    }
    if session.awaiting_batch() {
        lines.push("Generating new words...".to_string());
    } else if session.is_loading() {
        lines.push("Creating more words in the background...".to_string());
    }
    lines.join("\n")
}

pub fn display_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(
        out,
        "Commands: <n> place tile n | r <n> clear slot n | next | more | say | exit"
    )
}

/// Line-oriented implementation of the GameInterface trait.
/// Reads commands from any `BufRead` and prints to any `Write`.
pub struct CliInterface<R: BufRead, W: Write = io::Stdout> {
    reader: R,
    out: W,
    last_frame: String,
    closed: bool,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self::with_output(reader, io::stdout())
    }
}

impl<R: BufRead, W: Write> CliInterface<R, W> {
    pub fn with_output(reader: R, out: W) -> Self {
        Self {
            reader,
            out,
            last_frame: String::new(),
            closed: false,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

impl<R: BufRead, W: Write> GameInterface for CliInterface<R, W> {
    fn render(&mut self, session: &Session) {
        let frame = describe(session);
        if frame == self.last_frame {
            return;
        }
        if writeln!(self.out, "\n{frame}").is_err() {
            self.closed = true;
        }
        self.last_frame = frame;
    }

    fn next_action(&mut self, _wait: Duration) -> Option<UserAction> {
        if self.closed {
            return Some(UserAction::Exit);
        }
        let _ = write!(self.out, "> ");
        let _ = self.out.flush();

        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) | Err(_) => {
                self.closed = true;
                return Some(UserAction::Exit);
            }
            Ok(_) => {}
        }
        if input.trim().is_empty() {
            return None;
        }
        let action = parse_command(&input);
        if action.is_none() {
            let _ = display_help(&mut self.out);
        }
        action
    }

    fn blocks_on_input(&self) -> bool {
        true
    }
}
