//! Session context.
//!
//! Owns the score and streak, the word supply, and the active round, and turns
//! round transitions into scoring, history and collaborator notifications.
//! Work that has to happen later (timers, fetches) is returned as [`Effect`]s
//! for the driver to carry out.

use crate::random::RandomSource;
use crate::round::{Fired, Placement, RoundEngine, Timer, Verdict};
use crate::supply::{Step, WordSupply};
use crate::wordbank::WordEntry;
use crate::{debug_log, info_log};
use std::time::Duration;

/// Locale tag handed to the speech collaborator.
pub const SPEECH_LOCALE: &str = "hi-IN";

const BASE_POINTS: u32 = 10;
const STREAK_BONUS: u32 = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub score: u32,
    pub streak: u32,
}

impl Scoreboard {
    /// Award a solved word. Returns the points added.
    pub fn record_correct(&mut self) -> u32 {
        let points = BASE_POINTS + self.streak * STREAK_BONUS;
        self.score += points;
        self.streak += 1;
        points
    }

    pub fn record_incorrect(&mut self) {
        self.streak = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Correct,
    Incorrect,
}

/// Audio and speech output. Nothing it does feeds back into the game.
pub trait Announcer {
    fn play_tone(&mut self, tone: Tone);
    fn speak(&mut self, text: &str, locale: &str);
}

#[derive(Debug, Default)]
pub struct SilentAnnouncer;

impl Announcer for SilentAnnouncer {
    fn play_tone(&mut self, _tone: Tone) {}
    fn speak(&mut self, _text: &str, _locale: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Pause between filling the last slot and checking the answer.
    pub check_delay: Duration,
    /// How long a wrong answer stays on the board.
    pub retry_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            check_delay: Duration::from_millis(300),
            retry_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Schedule { timer: Timer, delay: Duration },
    Fetch { count: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRecord {
    pub word_id: String,
    pub solved: bool,
}

pub struct Session {
    supply: WordSupply,
    round: Option<RoundEngine>,
    scoreboard: Scoreboard,
    timing: Timing,
    rng: Box<dyn RandomSource>,
    announcer: Box<dyn Announcer>,
    history: Vec<RoundRecord>,
}

impl Session {
    pub fn new(
        supply: WordSupply,
        mut rng: Box<dyn RandomSource>,
        announcer: Box<dyn Announcer>,
    ) -> Self {
        let round = supply
            .current()
            .map(|word| RoundEngine::new(word, rng.as_mut()));
        Self {
            supply,
            round,
            scoreboard: Scoreboard::default(),
            timing: Timing::default(),
            rng,
            announcer,
            history: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    pub fn current_word(&self) -> Option<&WordEntry> {
        self.supply.current()
    }

    pub fn round(&self) -> Option<&RoundEngine> {
        self.round.as_ref()
    }

    pub fn supply(&self) -> &WordSupply {
        &self.supply
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.supply.is_fetching()
    }

    pub fn awaiting_batch(&self) -> bool {
        self.supply.awaiting_batch()
    }

    /// Round commands are accepted only when a round exists and no advance is parked.
    fn active_round(&mut self) -> Option<&mut RoundEngine> {
        if self.supply.awaiting_batch() {
            return None;
        }
        self.round.as_mut()
    }

    pub fn place(&mut self, tile: usize) -> Vec<Effect> {
        let check_delay = self.timing.check_delay;
        let Some(round) = self.active_round() else {
            return Vec::new();
        };
        match round.place(tile) {
            Placement::Filled { check, .. } => vec![Effect::Schedule {
                timer: check,
                delay: check_delay,
            }],
            Placement::Placed { .. } | Placement::Ignored => Vec::new(),
        }
    }

    pub fn remove(&mut self, slot: usize) -> bool {
        self.active_round().is_some_and(|round| round.remove(slot))
    }

    /// Deliver a due timer to the round.
    pub fn fire(&mut self, timer: Timer) -> Vec<Effect> {
        let Some(round) = self.round.as_mut() else {
            return Vec::new();
        };
        let verdict = match round.fire(timer) {
            Fired::Judged(verdict) => verdict,
            Fired::Stale | Fired::Cleared => return Vec::new(),
        };

        match verdict {
            Verdict::Correct => {
                let points = self.scoreboard.record_correct();
                info_log!(
                    "fire() - correct, +{} (score {}, streak {})",
                    points,
                    self.scoreboard.score,
                    self.scoreboard.streak
                );
                self.announcer.play_tone(Tone::Correct);
                self.record_round(true);
                Vec::new()
            }
            Verdict::Incorrect { retry, .. } => {
                self.scoreboard.record_incorrect();
                self.announcer.play_tone(Tone::Incorrect);
                vec![Effect::Schedule {
                    timer: retry,
                    delay: self.timing.retry_delay,
                }]
            }
            Verdict::Revealed => {
                self.scoreboard.record_incorrect();
                self.announcer.play_tone(Tone::Incorrect);
                self.record_round(false);
                Vec::new()
            }
        }
    }

    fn record_round(&mut self, solved: bool) {
        if let Some(word) = self.supply.current() {
            self.history.push(RoundRecord {
                word_id: word.id.clone(),
                solved,
            });
        }
    }

    /// Move on from a finished round.
    pub fn advance(&mut self) -> Vec<Effect> {
        let finished = self
            .active_round()
            .is_some_and(|round| round.status().is_terminal());
        if !finished {
            debug_log!("advance() - ignored, round still in play");
            return Vec::new();
        }
        match self.supply.advance() {
            Step::Moved(_) | Step::Wrapped => {
                self.start_round();
                Vec::new()
            }
            Step::Fetch(count) => vec![Effect::Fetch { count }],
            Step::Waiting | Step::Stay => Vec::new(),
        }
    }

    /// Ask for more words without leaving the current one.
    pub fn request_more(&mut self) -> Vec<Effect> {
        match self.supply.request_more() {
            Some(count) => vec![Effect::Fetch { count }],
            None => Vec::new(),
        }
    }

    /// Apply the result of a fetch started by an earlier [`Effect::Fetch`].
    pub fn finish_fetch(&mut self, batch: Vec<WordEntry>) {
        let moved = self.supply.finish_fetch(batch);
        if moved || self.round.is_none() {
            self.start_round();
        }
    }

    pub fn speak(&mut self) {
        if let Some(word) = self.supply.current() {
            self.announcer.speak(&word.hindi, SPEECH_LOCALE);
        }
    }

    fn start_round(&mut self) {
        let Some(word) = self.supply.current() else {
            return;
        };
        match self.round.as_mut() {
            Some(round) => round.restart(word, self.rng.as_mut()),
            None => self.round = Some(RoundEngine::new(word, self.rng.as_mut())),
        }
    }
}
