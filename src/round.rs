//! Round engine: one puzzle for one word.
//!
//! # State machine
//! `Idle` → (last slot filled, check timer fires) → `Correct` | `Incorrect` | `Revealed`
//!
//! - `Incorrect` returns to `Idle` when its retry timer fires.
//! - `Correct` and `Revealed` are terminal; the session advances to the next word.
//!
//! Timers are not owned here. The engine hands out a [`Timer`] and the caller
//! brings it back through [`RoundEngine::fire`] when it is due. Each timer is
//! tagged with the round and the mutation step it was issued at, so a timer
//! that outlives its round, or a board change, is ignored.

use crate::akshar::CONSONANTS;
use crate::random::{RandomSource, draw_distractors, shuffle};
use crate::wordbank::WordEntry;
use crate::{debug_log, info_log};

/// Tiles offered per round, targets included.
pub const POOL_SIZE: usize = 8;
/// Failed submissions allowed before the answer is revealed.
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    Idle,
    Correct,
    Incorrect,
    Revealed,
}

impl RoundStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Correct | Self::Revealed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub glyph: String,
    pub used: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTag {
    round: u64,
    step: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Validate the full board.
    Check,
    /// Clear the board after a wrong answer.
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub kind: TimerKind,
    pub tag: TimerTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Ignored,
    Placed { slot: usize },
    /// The last empty slot was filled; `check` must be fired to validate.
    Filled { slot: usize, check: Timer },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect { tries_left: u32, retry: Timer },
    Revealed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fired {
    Stale,
    Judged(Verdict),
    Cleared,
}

#[derive(Debug)]
pub struct RoundEngine {
    round: u64,
    step: u64,
    answer: String,
    target: Vec<String>,
    tiles: Vec<Tile>,
    /// Each filled slot points at the tile that filled it.
    slots: Vec<Option<usize>>,
    attempts: u32,
    status: RoundStatus,
}

/// Targets plus distractors, shuffled.
fn build_pool(target: &[String], rng: &mut dyn RandomSource) -> Vec<Tile> {
    let needed = POOL_SIZE.saturating_sub(target.len());
    let mut glyphs = target.to_vec();
    glyphs.extend(draw_distractors(&CONSONANTS, target, needed, rng));
    shuffle(&mut glyphs, rng);
    glyphs
        .into_iter()
        .map(|glyph| Tile { glyph, used: false })
        .collect()
}

impl RoundEngine {
    pub fn new(word: &WordEntry, rng: &mut dyn RandomSource) -> Self {
        let mut engine = Self {
            round: 0,
            step: 0,
            answer: String::new(),
            target: Vec::new(),
            tiles: Vec::new(),
            slots: Vec::new(),
            attempts: 0,
            status: RoundStatus::Idle,
        };
        engine.load(word, rng);
        engine
    }

    /// Start over with `word`. Timers issued before this call become stale.
    pub fn restart(&mut self, word: &WordEntry, rng: &mut dyn RandomSource) {
        self.round += 1;
        self.load(word, rng);
    }

    fn load(&mut self, word: &WordEntry, rng: &mut dyn RandomSource) {
        self.step = 0;
        self.answer.clone_from(&word.hindi);
        self.target = word.units();
        self.tiles = build_pool(&self.target, rng);
        self.slots = vec![None; self.target.len()];
        self.attempts = 0;
        self.status = RoundStatus::Idle;
        info_log!(
            "round {} - word '{}' ({} units, {} tiles)",
            self.round,
            word.id,
            self.target.len(),
            self.tiles.len()
        );
    }

    fn tag(&self) -> TimerTag {
        TimerTag {
            round: self.round,
            step: self.step,
        }
    }

    fn timer(&self, kind: TimerKind) -> Timer {
        Timer {
            kind,
            tag: self.tag(),
        }
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn tries_left(&self) -> u32 {
        MAX_ATTEMPTS - self.attempts
    }

    pub fn target_units(&self) -> &[String] {
        &self.target
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Glyph currently in each slot.
    pub fn slots(&self) -> Vec<Option<&str>> {
        self.slots
            .iter()
            .map(|slot| slot.map(|tile| self.tiles[tile].glyph.as_str()))
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Put tile `tile` into the first empty slot.
    pub fn place(&mut self, tile: usize) -> Placement {
        if self.status != RoundStatus::Idle {
            return Placement::Ignored;
        }
        let Some(candidate) = self.tiles.get(tile) else {
            return Placement::Ignored;
        };
        if candidate.used {
            return Placement::Ignored;
        }
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            return Placement::Ignored;
        };

        self.slots[slot] = Some(tile);
        self.tiles[tile].used = true;
        self.step += 1;
        debug_log!("place() - tile {} into slot {}", tile, slot);

        if self.is_full() {
            Placement::Filled {
                slot,
                check: self.timer(TimerKind::Check),
            }
        } else {
            Placement::Placed { slot }
        }
    }

    /// Empty `slot`, freeing its tile. Returns whether anything changed.
    pub fn remove(&mut self, slot: usize) -> bool {
        if self.status != RoundStatus::Idle {
            return false;
        }
        let Some(tile) = self.slots.get_mut(slot).and_then(Option::take) else {
            return false;
        };
        self.tiles[tile].used = false;
        self.step += 1;
        debug_log!("remove() - slot {} freed tile {}", slot, tile);
        true
    }

    /// Run a previously issued timer.
    pub fn fire(&mut self, timer: Timer) -> Fired {
        if timer.tag != self.tag() {
            debug_log!("fire() - stale {:?}", timer);
            return Fired::Stale;
        }
        match timer.kind {
            TimerKind::Check if self.status == RoundStatus::Idle && self.is_full() => {
                Fired::Judged(self.judge())
            }
            TimerKind::Retry if self.status == RoundStatus::Incorrect => {
                self.clear_board();
                self.status = RoundStatus::Idle;
                self.step += 1;
                Fired::Cleared
            }
            _ => Fired::Stale,
        }
    }

    fn judge(&mut self) -> Verdict {
        let submitted: String = self.slots().into_iter().flatten().collect();
        self.step += 1;

        if submitted == self.answer {
            self.status = RoundStatus::Correct;
            info_log!("judge() - '{}' correct", submitted);
            return Verdict::Correct;
        }

        self.attempts += 1;
        info_log!(
            "judge() - '{}' incorrect, attempt {}/{}",
            submitted,
            self.attempts,
            MAX_ATTEMPTS
        );
        if self.attempts >= MAX_ATTEMPTS {
            self.reveal();
            Verdict::Revealed
        } else {
            self.status = RoundStatus::Incorrect;
            Verdict::Incorrect {
                tries_left: self.tries_left(),
                retry: self.timer(TimerKind::Retry),
            }
        }
    }

    fn clear_board(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        for tile in &mut self.tiles {
            tile.used = false;
        }
    }

    /// Show the answer: slot `i` gets a tile carrying `target[i]`.
    fn reveal(&mut self) {
        self.clear_board();
        for (slot, unit) in self.target.iter().enumerate() {
            let found = self
                .tiles
                .iter()
                .position(|tile| !tile.used && tile.glyph == *unit);
            if let Some(tile) = found {
                self.tiles[tile].used = true;
                self.slots[slot] = Some(tile);
            }
        }
        self.status = RoundStatus::Revealed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::testing::ScriptedRandom;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn word(hindi: &str) -> WordEntry {
        WordEntry::new("t", hindi, "English", "Latin")
    }

    fn engine(hindi: &str) -> RoundEngine {
        RoundEngine::new(&word(hindi), &mut StdRng::seed_from_u64(11))
    }

    fn tile_of(engine: &RoundEngine, glyph: &str) -> usize {
        engine
            .tiles()
            .iter()
            .position(|t| t.glyph == glyph && !t.used)
            .unwrap()
    }

    /// Place the given glyphs in order and fire the resulting check.
    fn submit(engine: &mut RoundEngine, glyphs: &[&str]) -> Verdict {
        let mut check = None;
        for glyph in glyphs {
            let tile = tile_of(engine, glyph);
            if let Placement::Filled { check: timer, .. } = engine.place(tile) {
                check = Some(timer);
            }
        }
        match engine.fire(check.unwrap()) {
            Fired::Judged(verdict) => verdict,
            other => panic!("expected a verdict, got {other:?}"),
        }
    }

    /// Submit a wrong answer and let the retry timer clear the board.
    fn fail_and_retry(engine: &mut RoundEngine, glyphs: &[&str]) {
        match submit(engine, glyphs) {
            Verdict::Incorrect { retry, .. } => assert_eq!(engine.fire(retry), Fired::Cleared),
            other => panic!("expected Incorrect, got {other:?}"),
        }
    }

    #[test]
    fn test_exact_pool_from_scripted_random() {
        // 7 -> ज is a target and is rejected; 0..=5 draw क ख ग घ ङ च;
        // shuffle draws 7..=1 leave the order untouched.
        let mut rng = ScriptedRandom::new(&[7, 0, 1, 2, 3, 4, 5, 7, 6, 5, 4, 3, 2, 1]);
        let engine = RoundEngine::new(&word("जल"), &mut rng);
        let glyphs: Vec<&str> = engine.tiles().iter().map(|t| t.glyph.as_str()).collect();
        assert_eq!(glyphs, vec!["ज", "ल", "क", "ख", "ग", "घ", "ङ", "च"]);
    }

    #[test]
    fn test_new_round_shape() {
        let engine = engine("जल");
        assert_eq!(engine.target_units(), ["ज", "ल"]);
        assert_eq!(engine.slots(), vec![None, None]);
        assert_eq!(engine.tiles().len(), POOL_SIZE);
        assert_eq!(engine.status(), RoundStatus::Idle);
        assert_eq!(engine.attempts(), 0);
        assert_eq!(engine.tries_left(), 3);
    }

    #[test]
    fn test_pool_contains_targets_once_and_distinct_distractors() {
        let mut rng = StdRng::seed_from_u64(99);
        for hindi in ["जल", "घर", "पत्र", "कल", "सच"] {
            for _ in 0..50 {
                let engine = RoundEngine::new(&word(hindi), &mut rng);
                let glyphs: Vec<&str> =
                    engine.tiles().iter().map(|t| t.glyph.as_str()).collect();
                assert_eq!(glyphs.len(), POOL_SIZE);
                let unique: HashSet<&str> = glyphs.iter().copied().collect();
                assert_eq!(unique.len(), POOL_SIZE, "duplicate tile in {glyphs:?}");
                for unit in engine.target_units() {
                    assert_eq!(glyphs.iter().filter(|g| **g == unit).count(), 1);
                }
            }
        }
    }

    #[test]
    fn test_pool_without_room_for_distractors() {
        let eight = engine("कखगघङचछज");
        assert_eq!(eight.target_units().len(), 8);
        assert_eq!(eight.tiles().len(), 8);

        let nine = engine("कखगघङचछजझ");
        assert_eq!(nine.target_units().len(), 9);
        assert_eq!(nine.tiles().len(), 9);
        assert_eq!(nine.slots().len(), 9);
    }

    #[test]
    fn test_place_fills_lowest_empty_slot() {
        let mut engine = engine("जल");
        let l = tile_of(&engine, "ल");
        assert_eq!(engine.place(l), Placement::Placed { slot: 0 });
        assert_eq!(engine.slots(), vec![Some("ल"), None]);
        assert!(engine.tiles()[l].used);
    }

    #[test]
    fn test_same_tile_cannot_fill_two_slots() {
        let mut engine = engine("जल");
        let j = tile_of(&engine, "ज");
        engine.place(j);
        assert_eq!(engine.place(j), Placement::Ignored);
        assert_eq!(engine.slots(), vec![Some("ज"), None]);
    }

    #[test]
    fn test_place_out_of_range_is_ignored() {
        let mut engine = engine("जल");
        assert_eq!(engine.place(42), Placement::Ignored);
    }

    #[test]
    fn test_remove_frees_slot_and_tile() {
        let mut engine = engine("जल");
        let j = tile_of(&engine, "ज");
        let l = tile_of(&engine, "ल");
        engine.place(j);
        engine.place(l);
        assert!(engine.remove(0));
        assert_eq!(engine.slots(), vec![None, Some("ल")]);
        assert!(!engine.tiles()[j].used);
        assert!(matches!(engine.place(j), Placement::Filled { slot: 0, .. }));
    }

    #[test]
    fn test_remove_empty_or_missing_slot_is_noop() {
        let mut engine = engine("जल");
        assert!(!engine.remove(0));
        assert!(!engine.remove(5));
    }

    #[test]
    fn test_correct_answer() {
        let mut engine = engine("जल");
        assert_eq!(submit(&mut engine, &["ज", "ल"]), Verdict::Correct);
        assert_eq!(engine.status(), RoundStatus::Correct);
        assert!(engine.status().is_terminal());
        assert_eq!(engine.slots(), vec![Some("ज"), Some("ल")]);
    }

    #[test]
    fn test_wrong_order_is_incorrect_then_clears() {
        let mut engine = engine("जल");
        let verdict = submit(&mut engine, &["ल", "ज"]);
        let Verdict::Incorrect { tries_left, retry } = verdict else {
            panic!("expected Incorrect, got {verdict:?}");
        };
        assert_eq!(tries_left, 2);
        assert_eq!(engine.status(), RoundStatus::Incorrect);
        assert_eq!(engine.attempts(), 1);

        assert_eq!(engine.fire(retry), Fired::Cleared);
        assert_eq!(engine.status(), RoundStatus::Idle);
        assert_eq!(engine.slots(), vec![None, None]);
        assert!(engine.tiles().iter().all(|t| !t.used));
        assert_eq!(engine.attempts(), 1);
    }

    #[test]
    fn test_commands_ignored_while_not_idle() {
        let mut engine = engine("जल");
        submit(&mut engine, &["ल", "ज"]);
        let free = engine.tiles().iter().position(|t| !t.used).unwrap();
        assert_eq!(engine.place(free), Placement::Ignored);
        assert!(!engine.remove(0));
        assert_eq!(engine.slots(), vec![Some("ल"), Some("ज")]);
    }

    #[test]
    fn test_correct_after_prior_failures() {
        for failures in 0..3 {
            let mut engine = engine("जल");
            for _ in 0..failures {
                fail_and_retry(&mut engine, &["ल", "ज"]);
            }
            assert_eq!(submit(&mut engine, &["ज", "ल"]), Verdict::Correct);
            assert_eq!(engine.attempts(), failures);
        }
    }

    #[test]
    fn test_third_failure_reveals_answer() {
        let mut engine = engine("घर");
        fail_and_retry(&mut engine, &["र", "घ"]);
        fail_and_retry(&mut engine, &["र", "घ"]);
        assert_eq!(submit(&mut engine, &["र", "घ"]), Verdict::Revealed);
        assert_eq!(engine.status(), RoundStatus::Revealed);
        assert_eq!(engine.slots(), vec![Some("घ"), Some("र")]);
        assert_eq!(engine.attempts(), MAX_ATTEMPTS);
        assert_eq!(engine.tries_left(), 0);

        let free = engine.tiles().iter().position(|t| !t.used).unwrap();
        assert_eq!(engine.place(free), Placement::Ignored);
    }

    #[test]
    fn test_reveal_with_distractor_submission() {
        let mut engine = engine("घर");
        let wrong: Vec<String> = engine
            .tiles()
            .iter()
            .filter(|t| t.glyph != "घ" && t.glyph != "र")
            .take(2)
            .map(|t| t.glyph.clone())
            .collect();
        let wrong: Vec<&str> = wrong.iter().map(String::as_str).collect();
        fail_and_retry(&mut engine, &wrong);
        fail_and_retry(&mut engine, &wrong);
        assert_eq!(submit(&mut engine, &wrong), Verdict::Revealed);
        assert_eq!(engine.slots(), vec![Some("घ"), Some("र")]);
    }

    #[test]
    fn test_reveal_conjunct_word() {
        let mut engine = engine("पत्र");
        for _ in 0..2 {
            fail_and_retry(&mut engine, &["त्र", "प"]);
        }
        assert_eq!(submit(&mut engine, &["त्र", "प"]), Verdict::Revealed);
        assert_eq!(engine.slots(), vec![Some("प"), Some("त्र")]);
    }

    #[test]
    fn test_check_is_stale_after_board_change() {
        let mut engine = engine("जल");
        engine.place(tile_of(&engine, "ज"));
        let Placement::Filled { check, .. } = engine.place(tile_of(&engine, "ल")) else {
            panic!("board should be full");
        };
        engine.remove(1);
        assert_eq!(engine.fire(check), Fired::Stale);
        assert_eq!(engine.status(), RoundStatus::Idle);
        assert_eq!(engine.attempts(), 0);
    }

    #[test]
    fn test_timer_from_previous_round_is_ignored() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut engine = RoundEngine::new(&word("जल"), &mut rng);
        let verdict = submit(&mut engine, &["ल", "ज"]);
        let Verdict::Incorrect { retry, .. } = verdict else {
            panic!("expected Incorrect");
        };

        engine.restart(&word("घर"), &mut rng);
        engine.place(tile_of(&engine, "घ"));
        assert_eq!(engine.fire(retry), Fired::Stale);
        assert_eq!(engine.slots(), vec![Some("घ"), None]);
        assert_eq!(engine.status(), RoundStatus::Idle);
    }

    #[test]
    fn test_check_fires_only_once() {
        let mut engine = engine("जल");
        engine.place(tile_of(&engine, "ज"));
        let Placement::Filled { check, .. } = engine.place(tile_of(&engine, "ल")) else {
            panic!("board should be full");
        };
        assert_eq!(engine.fire(check), Fired::Judged(Verdict::Correct));
        assert_eq!(engine.fire(check), Fired::Stale);
    }

    #[test]
    fn test_restart_resets_attempts() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut engine = RoundEngine::new(&word("जल"), &mut rng);
        fail_and_retry(&mut engine, &["ल", "ज"]);
        assert_eq!(engine.attempts(), 1);
        engine.restart(&word("पत्र"), &mut rng);
        assert_eq!(engine.attempts(), 0);
        assert_eq!(engine.slots().len(), engine.target_units().len());
    }
}
