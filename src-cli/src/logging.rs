//! Structured logging for the command-line player.
//!
//! Two layers share one registry:
//! - a human-readable console layer on stderr, so stdout stays clean for
//!   command output
//! - a JSON file layer with rotation and bounded retention

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Targets that get their own, more verbose, directives.
const OWN_TARGETS: [&str; 2] = ["tubeplay", "tubeplay_core"];

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files are stored.
    pub log_directory: PathBuf,
    /// Log file name prefix (`tubeplay` -> `tubeplay.2026-01-15.log`).
    pub log_file_prefix: String,
    /// Maximum level printed to the console for our own targets.
    pub console_level: Level,
    /// Maximum level written to the log file for our own targets.
    pub file_level: Level,
    /// How often to rotate log files.
    pub rotation: LogRotation,
    /// Number of rotated files to keep (0 = keep all).
    pub max_log_files: usize,
    /// Whether to include ANSI color codes in console output.
    pub console_ansi: bool,
    /// Whether to include file/line info in console logs.
    pub include_file_line: bool,
    /// Whether to include the target module in console logs.
    pub include_target: bool,
    /// Whether to log span open/close events.
    pub log_span_events: bool,
}

/// Log rotation frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    /// Create a new log file every hour.
    Hourly,
    /// Create a new log file every day.
    Daily,
    /// Never rotate (single log file).
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
            LogRotation::Never => Self::NEVER,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LoggingConfig {
    /// Verbose configuration for debug builds.
    #[must_use]
    pub fn development() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "tubeplay".to_string(),
            console_level: Level::DEBUG,
            file_level: Level::TRACE,
            rotation: LogRotation::Hourly,
            max_log_files: 24,
            console_ansi: true,
            include_file_line: true,
            include_target: true,
            log_span_events: true,
        }
    }

    /// Quiet console, detailed file.
    #[must_use]
    pub fn production() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "tubeplay".to_string(),
            console_level: Level::WARN,
            file_level: Level::DEBUG,
            rotation: LogRotation::Daily,
            max_log_files: 7,
            console_ansi: true,
            include_file_line: false,
            include_target: false,
            log_span_events: false,
        }
    }

    /// Pick a configuration from the build profile.
    #[must_use]
    pub fn auto() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }

    /// Set the log directory.
    #[must_use]
    pub fn with_log_directory(mut self, path: PathBuf) -> Self {
        self.log_directory = path;
        self
    }

    /// Set the console log level.
    #[must_use]
    pub const fn with_console_level(mut self, level: Level) -> Self {
        self.console_level = level;
        self
    }

    /// Set the log rotation frequency.
    #[must_use]
    pub const fn with_rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Keeps the file writer alive. Drop to flush and close log files.
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Install the console and file layers.
///
/// `RUST_LOG` overrides the console filter when set. The returned guard must
/// be held until shutdown.
///
/// # Errors
///
/// Returns an error if the log directory or file cannot be created, or if a
/// global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    if !config.log_directory.exists() {
        std::fs::create_dir_all(&config.log_directory).map_err(|e| {
            LoggingError::DirectoryCreationFailed {
                path: config.log_directory.clone(),
                reason: e.to_string(),
            }
        })?;
    }

    let file_appender = RollingFileAppender::builder()
        .rotation(config.rotation.into())
        .filename_prefix(&config.log_file_prefix)
        .filename_suffix("log")
        .max_log_files(config.max_log_files)
        .build(&config.log_directory)
        .map_err(|e| LoggingError::AppenderFailed(e.to_string()))?;
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    // Dependencies stay at warn on the console unless RUST_LOG says otherwise.
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => own_targets_filter("warn", config.console_level)?,
    };
    let file_filter = own_targets_filter(level_to_directive(config.file_level), Level::TRACE)?;

    let span_events = if config.log_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.console_ansi)
        .with_target(config.include_target)
        .with_file(config.include_file_line)
        .with_line_number(config.include_file_line)
        .with_span_events(span_events.clone())
        .with_filter(console_filter);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .json()
        .with_filter(file_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Base filter plus one directive per own target at `level`.
fn own_targets_filter(base: &str, level: Level) -> Result<EnvFilter, LoggingError> {
    OWN_TARGETS
        .iter()
        .try_fold(EnvFilter::new(base), |filter, target| {
            let directive = format!("{target}={}", level_to_directive(level));
            directive
                .parse::<Directive>()
                .map(|d| filter.add_directive(d))
                .map_err(|e| LoggingError::InvalidDirective {
                    directive,
                    reason: e.to_string(),
                })
        })
}

/// Get the default log directory.
#[must_use]
pub fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tubeplay")
        .join("logs")
}

/// Convert a tracing Level to a filter directive string.
const fn level_to_directive(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create the log directory.
    #[error("Failed to create log directory {path}: {reason}")]
    DirectoryCreationFailed {
        /// The path that could not be created.
        path: PathBuf,
        /// The reason for the failure.
        reason: String,
    },

    /// Failed to open the rolling log file.
    #[error("Failed to create log file appender: {0}")]
    AppenderFailed(String),

    /// A filter directive did not parse.
    #[error("Invalid log directive '{directive}': {reason}")]
    InvalidDirective {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber was already set.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_production() {
        let config = LoggingConfig::default();
        assert_eq!(config.console_level, Level::WARN);
        assert_eq!(config.file_level, Level::DEBUG);
        assert_eq!(config.rotation, LogRotation::Daily);
        assert_eq!(config.max_log_files, 7);
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::development();
        assert_eq!(config.console_level, Level::DEBUG);
        assert_eq!(config.file_level, Level::TRACE);
        assert_eq!(config.rotation, LogRotation::Hourly);
        assert!(config.include_file_line);
        assert!(config.log_span_events);
    }

    #[test]
    fn test_config_builder() {
        let dir = PathBuf::from("/tmp/tubeplay-logs");
        let config = LoggingConfig::production()
            .with_console_level(Level::DEBUG)
            .with_rotation(LogRotation::Never)
            .with_log_directory(dir.clone());

        assert_eq!(config.console_level, Level::DEBUG);
        assert_eq!(config.rotation, LogRotation::Never);
        assert_eq!(config.log_directory, dir);
    }

    #[test]
    fn test_log_rotation_conversion() {
        assert!(matches!(Rotation::from(LogRotation::Hourly), Rotation::HOURLY));
        assert!(matches!(Rotation::from(LogRotation::Daily), Rotation::DAILY));
        assert!(matches!(Rotation::from(LogRotation::Never), Rotation::NEVER));
    }

    #[test]
    fn test_own_targets_filter_builds() {
        let filter = own_targets_filter("warn", Level::DEBUG);
        assert!(filter.is_ok());
        let rendered = filter.map(|f| f.to_string()).unwrap_or_default();
        assert!(rendered.contains("tubeplay_core=debug"));
    }

    #[test]
    fn test_default_log_directory() {
        let dir = default_log_directory();
        assert!(dir.to_string_lossy().contains("tubeplay"));
        assert!(dir.ends_with("logs"));
    }
}
