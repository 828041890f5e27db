//! Ordered word list with a cursor and at most one outstanding fetch.
//!
//! The list only grows. A fetch is started by [`WordSupply::advance`] at the
//! last word or by [`WordSupply::request_more`]; the caller performs it and
//! hands the batch back through [`WordSupply::finish_fetch`].

use crate::info_log;
use crate::wordbank::WordEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchMode {
    /// Append only.
    Background,
    /// Append, then step the cursor into the new words (or wrap on failure).
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Cursor moved to this index.
    Moved(usize),
    /// Past the end with no generator: back to the first word.
    Wrapped,
    /// Start a fetch for this many words; the cursor moves when it lands.
    Fetch(usize),
    /// A fetch is already out; the cursor moves when it lands.
    Waiting,
    /// Nothing to move through.
    Stay,
}

#[derive(Debug)]
pub struct WordSupply {
    words: Vec<WordEntry>,
    cursor: usize,
    generation: bool,
    batch_size: usize,
    pending: Option<FetchMode>,
}

impl WordSupply {
    pub fn new(words: Vec<WordEntry>, generation: bool, batch_size: usize) -> Self {
        Self {
            words,
            cursor: 0,
            generation,
            batch_size,
            pending: None,
        }
    }

    pub fn current(&self) -> Option<&WordEntry> {
        self.words.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn generation_enabled(&self) -> bool {
        self.generation
    }

    pub fn is_fetching(&self) -> bool {
        self.pending.is_some()
    }

    /// An advance is parked until the outstanding fetch lands.
    pub fn awaiting_batch(&self) -> bool {
        self.pending == Some(FetchMode::Advance)
    }

    pub fn append(&mut self, batch: Vec<WordEntry>) {
        self.words.extend(batch);
    }

    pub fn advance(&mut self) -> Step {
        if self.words.is_empty() {
            return Step::Stay;
        }
        if self.cursor + 1 < self.words.len() {
            self.cursor += 1;
            return Step::Moved(self.cursor);
        }
        if !self.generation {
            self.cursor = 0;
            info_log!("advance() - end of list, wrapping to start");
            return Step::Wrapped;
        }
        match self.pending {
            Some(FetchMode::Advance) => Step::Waiting,
            Some(FetchMode::Background) => {
                self.pending = Some(FetchMode::Advance);
                Step::Waiting
            }
            None => {
                self.pending = Some(FetchMode::Advance);
                info_log!("advance() - end of list, fetching {} words", self.batch_size);
                Step::Fetch(self.batch_size)
            }
        }
    }

    /// Ask for a batch without moving. `None` when generation is off or a
    /// fetch is already out.
    pub fn request_more(&mut self) -> Option<usize> {
        if !self.generation || self.pending.is_some() {
            return None;
        }
        self.pending = Some(FetchMode::Background);
        Some(self.batch_size)
    }

    /// Apply a finished fetch. An empty batch means the fetch failed.
    /// Returns whether the cursor moved.
    pub fn finish_fetch(&mut self, batch: Vec<WordEntry>) -> bool {
        let mode = self.pending.take();
        let received = batch.len();
        let start = self.words.len();
        self.append(batch);
        info_log!(
            "finish_fetch() - {} words received, list now {}",
            received,
            self.words.len()
        );

        if mode != Some(FetchMode::Advance) || self.words.is_empty() {
            return false;
        }
        self.cursor = if received > 0 { start } else { 0 };
        true
    }
}
