//! Logging initialization for tracker_app.
//!
//! The file logger truncates its target on start; the default target is
//! `./tracker.log` in the current working directory.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const DEFAULT_LOG_FILE: &str = "./tracker.log";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    /// Write to the log file only. The terminal stays free for the job panel.
    #[default]
    File,
    /// Write to the terminal (stderr for warnings and errors).
    Terminal,
    Both,
}

impl LogDestination {
    fn to_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }

    fn to_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }
}

/// Installs the global logger. Does nothing if one is already set or no
/// destination could be opened.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_file: &Path) {
    let loggers = build_loggers(destination, level, log_file);
    if loggers.is_empty() {
        return;
    }
    let _ = CombinedLogger::init(loggers);
}

fn build_loggers(
    destination: LogDestination,
    level: LevelFilter,
    log_file: &Path,
) -> Vec<Box<dyn SharedLogger>> {
    let config = build_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if destination.to_terminal() {
        loggers.push(TermLogger::new(
            level,
            config.clone(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if destination.to_file() {
        match File::create(log_file) {
            Ok(file) => loggers.push(WriteLogger::new(level, config, file)),
            Err(err) => eprintln!(
                "Warning: could not create log file {}: {}",
                log_file.display(),
                err
            ),
        }
    }
    loggers
}

fn build_config() -> Config {
    // Dependencies (reqwest, hyper) only get through at error level.
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_destination_creates_the_log_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tracker.log");

        let loggers = build_loggers(LogDestination::File, LevelFilter::Info, &path);
        assert_eq!(loggers.len(), 1);
        assert!(path.exists());
    }

    #[test]
    fn unwritable_log_file_is_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing-dir").join("tracker.log");

        assert!(build_loggers(LogDestination::File, LevelFilter::Info, &path).is_empty());
        assert_eq!(
            build_loggers(LogDestination::Both, LevelFilter::Info, &path).len(),
            1
        );
    }
}
