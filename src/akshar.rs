//! Devanagari letter units.
//!
//! A letter unit is what the player sees on one tile: a base character plus
//! every dependent mark that belongs to it. A virama glues the following
//! consonant into the same unit, so conjuncts such as `त्र` stay whole.

const VIRAMA: char = '\u{094D}';
const ZWNJ: char = '\u{200C}';
const ZWJ: char = '\u{200D}';

/// Consonants and the three traditional conjuncts, in varnamala order.
pub const CONSONANTS: [&str; 36] = [
    "क", "ख", "ग", "घ", "ङ", //
    "च", "छ", "ज", "झ", "ञ", //
    "ट", "ठ", "ड", "ढ", "ण", //
    "त", "थ", "द", "ध", "न", //
    "प", "फ", "ब", "भ", "म", //
    "य", "र", "ल", "व", //
    "श", "ष", "स", "ह", //
    "क्ष", "त्र", "ज्ञ",
];

fn is_dependent_mark(c: char) -> bool {
    matches!(c,
        '\u{0900}'..='\u{0903}'
        | '\u{093A}'..='\u{093C}'
        | '\u{093E}'..='\u{094F}'
        | '\u{0951}'..='\u{0957}'
        | '\u{0962}'..='\u{0963}')
}

/// Split `text` into ordered letter units. Joining the result gives `text` back.
pub fn letter_units(text: &str) -> Vec<String> {
    let mut units: Vec<String> = Vec::new();
    let mut glue_next = false;

    for c in text.chars() {
        if let Some(last) = units.last_mut() {
            if c == ZWJ || c == ZWNJ {
                last.push(c);
                continue;
            }
            if glue_next || is_dependent_mark(c) {
                last.push(c);
                glue_next = c == VIRAMA;
                continue;
            }
        }
        glue_next = c == VIRAMA;
        units.push(c.to_string());
    }
    units
}

/// True when `text` is non-empty and made only of Devanagari block characters
/// (joiners allowed).
pub fn is_devanagari(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| matches!(c, '\u{0900}'..='\u{097F}') || c == ZWJ || c == ZWNJ)
}
