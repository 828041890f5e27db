// Logging setup plus conditional macros that vanish from release builds.
//
// The full-screen UI owns the terminal, so records go to a file under the
// user's data directory. `RUST_LOG` picks the level.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "hindi-word-master";
const LOG_FILE: &str = "game.log";

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

// Failures are kept in release builds.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        log::warn!($($arg)*);
    };
}

#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        log::error!($($arg)*);
    };
}

pub fn log_file_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR).join(LOG_FILE))
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Install the global logger. Returns the log file when one could be opened;
/// otherwise records go to stderr.
pub fn init_logging() -> Option<PathBuf> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    let path = log_file_path();
    let file = path.as_deref().and_then(open_log_file);
    let opened = file.is_some();
    if let Some(file) = file {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    // A logger may already be installed (tests); keep that one.
    let _ = builder.try_init();

    if opened { path } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_macros_accept_format_arguments() {
        let words = 3;
        debug_log!("debug {}", words);
        info_log!("info {words}");
        warn_log!("warn {}", words);
        error_log!("error {words}");
    }

    #[test]
    fn test_log_file_lives_in_app_dir() {
        if let Some(path) = log_file_path() {
            assert!(path.ends_with(Path::new(APP_DIR).join(LOG_FILE)));
        }
    }
}
