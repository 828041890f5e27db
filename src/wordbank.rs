use crate::akshar::{is_devanagari, letter_units};
use crate::round::POOL_SIZE;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

pub const EMBEDDED_WORDBANK: &str = include_str!("resources/words.tsv");

/// One playable word. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordEntry {
    pub id: String,
    pub hindi: String,
    pub english: String,
    pub transliteration: String,
}

impl WordEntry {
    pub fn new(
        id: impl Into<String>,
        hindi: impl Into<String>,
        english: impl Into<String>,
        transliteration: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            hindi: hindi.into(),
            english: english.into(),
            transliteration: transliteration.into(),
        }
    }

    /// Ordered letter units of the Hindi spelling.
    pub fn units(&self) -> Vec<String> {
        letter_units(&self.hindi)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WordbankError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("word list contains no playable entries")]
    Empty,
}

/// True when `hindi` can be played: Devanagari, and no more letter units
/// than there are tiles a player can pick.
pub fn is_playable(hindi: &str) -> bool {
    is_devanagari(hindi) && letter_units(hindi).len() <= POOL_SIZE
}

/// Parse one `hindi<TAB>english<TAB>transliteration` line.
fn parse_line(line: &str) -> Option<(String, String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let mut fields = line.split('\t').map(str::trim);
    let hindi = fields.next().filter(|f| is_playable(f))?;
    let english = fields.next().filter(|f| !f.is_empty())?;
    let transliteration = fields.next().filter(|f| !f.is_empty())?;
    Some((hindi.to_string(), english.to_string(), transliteration.to_string()))
}

fn to_entries<I: Iterator<Item = (String, String, String)>>(rows: I) -> Vec<WordEntry> {
    rows.enumerate()
        .map(|(i, (hindi, english, transliteration))| {
            WordEntry::new((i + 1).to_string(), hindi, english, transliteration)
        })
        .collect()
}

pub fn load_wordbank_from_str(data: &str) -> Vec<WordEntry> {
    to_entries(data.lines().filter_map(parse_line))
}

pub fn load_wordbank_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<WordEntry>, WordbankError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();
    for line in reader.lines() {
        if let Some(row) = parse_line(&line?) {
            rows.push(row);
        }
    }
    let words = to_entries(rows.into_iter());
    if words.is_empty() {
        return Err(WordbankError::Empty);
    }
    Ok(words)
}

/// The built-in list of two-akshar words.
pub fn seed_words() -> Vec<WordEntry> {
    load_wordbank_from_str(EMBEDDED_WORDBANK)
}
