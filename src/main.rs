use hindi_word_master::cli::{CliInterface, parse_cli};
use hindi_word_master::generator::GeminiGenerator;
use hindi_word_master::logging::init_logging;
use hindi_word_master::random::RandomSource;
use hindi_word_master::session::{Announcer, SilentAnnouncer};
use hindi_word_master::tui::{TerminalAnnouncer, TuiInterface};
use hindi_word_master::{error_log, info_log, warn_log};
use hindi_word_master::{Session, WordSupply, game_loop, load_wordbank_from_file, seed_words};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = parse_cli();
    let log_path = init_logging();
    info_log!("starting, log file {:?}", log_path);

    let words = match &cli.wordbank_path {
        Some(path) => match load_wordbank_from_file(path) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("Failed to load word list from '{path}': {e}");
                return ExitCode::FAILURE;
            }
        },
        None => seed_words(),
    };
    info_log!("loaded {} words", words.len());

    let generator = Arc::new(GeminiGenerator::new(cli.resolved_api_key()).with_model(&cli.model));
    if !generator.has_credential() {
        warn_log!("no API key configured, word generation disabled");
    }
    let supply = WordSupply::new(words, generator.has_credential(), cli.batch_size);

    let rng: Box<dyn RandomSource> = match cli.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(StdRng::from_os_rng()),
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let announcer: Box<dyn Announcer> = if cli.plain {
        Box::new(SilentAnnouncer)
    } else {
        Box::new(TerminalAnnouncer)
    };
    let mut session = Session::new(supply, rng, announcer).with_timing(cli.timing());

    let scoreboard = if cli.plain {
        let mut interface = CliInterface::new(io::stdin().lock());
        game_loop(&mut session, &mut interface, generator, runtime.handle())
    } else {
        let mut interface = match TuiInterface::new() {
            Ok(interface) => interface,
            Err(e) => {
                eprintln!("Failed to initialize terminal: {e}");
                return ExitCode::FAILURE;
            }
        };
        let scoreboard = game_loop(&mut session, &mut interface, generator, runtime.handle());
        if let Err(e) = interface.cleanup() {
            error_log!("failed to restore terminal: {e}");
        }
        scoreboard
    };

    println!(
        "Final score: {} ({} words played)",
        scoreboard.score,
        session.history().len()
    );
    ExitCode::SUCCESS
}
