// Library interface for hindi-word-master
// This allows integration tests to access internal modules

pub mod akshar;
pub mod cli;
pub mod game_state;
pub mod generator;
pub mod logging;
pub mod random;
pub mod round;
pub mod session;
pub mod supply;
pub mod tui;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use akshar::letter_units;
pub use game_state::{GameInterface, UserAction, game_loop};
pub use generator::{GeminiGenerator, WordGenerator};
pub use round::{RoundEngine, RoundStatus};
pub use session::{Scoreboard, Session, Timing};
pub use supply::WordSupply;
pub use wordbank::{WordEntry, load_wordbank_from_file, load_wordbank_from_str, seed_words};
