//! Structured logging setup on `tracing-subscriber`.
//!
//! Output formats:
//! - **pretty**: multi-line, human-oriented
//! - **json**: one JSON object per event
//! - **compact**: single line per event
//!
//! Binaries call [`init_logging`] (stderr) or [`init_logging_to_file`]
//! (for the terminal dashboard, whose screen owns stdout/stderr).

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("unknown log format: {s}")),
        }
    }
}

#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("failed to open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("logging already initialized: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Filter directive, e.g. `info` or `agentboard_core=debug,warn`.
    pub level: String,
    pub format: LogFormat,
    /// Include file name and line number.
    pub with_file: bool,
    /// Include the module path.
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_file: false,
            with_target: true,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Level from `RUST_LOG`, format from `LOG_FORMAT`.
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        Self {
            level,
            format,
            ..Default::default()
        }
    }
}

/// Install the global subscriber writing to stderr.
pub fn init_logging(config: &LogConfig) -> Result<(), LogInitError> {
    install(config, BoxMakeWriter::new(std::io::stderr), true)
}

/// Install the global subscriber appending to `path`.
pub fn init_logging_to_file(config: &LogConfig, path: &Path) -> Result<(), LogInitError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| LogInitError::File {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogInitError::File {
            path: path.display().to_string(),
            source,
        })?;
    install(config, BoxMakeWriter::new(Mutex::new(file)), false)
}

fn install(config: &LogConfig, writer: BoxMakeWriter, ansi: bool) -> Result<(), LogInitError> {
    let env_filter = EnvFilter::try_new(&config.level)?;
    let base = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_file(config.with_file)
        .with_line_number(config.with_file)
        .with_target(config.with_target);

    let registry = tracing_subscriber::registry().with(env_filter);
    match config.format {
        LogFormat::Pretty => registry.with(base.pretty()).try_init()?,
        LogFormat::Json => registry.with(base.json()).try_init()?,
        LogFormat::Compact => registry.with(base.compact()).try_init()?,
    }

    tracing::debug!(format = ?config.format, level = %config.level, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("compact".parse::<LogFormat>(), Ok(LogFormat::Compact));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn builder() {
        let config = LogConfig::new("debug").with_format(LogFormat::Compact);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Compact);
    }

    #[test]
    fn bad_filter_is_rejected() {
        let config = LogConfig::new("agentboard=notalevel");
        assert!(matches!(init_logging(&config), Err(LogInitError::Filter(_))));
    }
}
