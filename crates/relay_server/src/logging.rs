//! Logger initialization for the relay binary.

use std::fs::File;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use crate::config::LogSettings;

/// Destination for log output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to the terminal (stdout/stderr).
    Terminal,
    /// Write to both the terminal and the given file.
    Both(PathBuf),
}

impl LogDestination {
    /// Terminal always; file as well when one is configured.
    pub fn from_settings(settings: &LogSettings) -> Self {
        match &settings.file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }
}

/// Install the global logger. Later calls are ignored.
///
/// If the log file cannot be created the terminal logger is still installed.
pub fn initialize(level: LevelFilter, destination: LogDestination) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::Terminal => vec![terminal_logger(level, config)],
        LogDestination::Both(path) => {
            let mut loggers = vec![terminal_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(level, config, &path) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        // Dependencies are chatty at debug level.
        .add_filter_allow_str("relay_")
        .add_filter_allow_str("a11y_relay")
        .build()
}

fn terminal_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    path: &Path,
) -> Option<Box<dyn SharedLogger>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file) as Box<dyn SharedLogger>),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
