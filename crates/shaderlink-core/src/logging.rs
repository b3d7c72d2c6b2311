//! Logging system for Shaderlink
//!
//! Structured logging through `tracing`, with a global level and per-category
//! switches so builder traces can be silenced without touching host logs.

use crate::config::LoggingConfig;
use crate::error::{Result, ShaderlinkError};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log levels for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// Categories for organizing log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogCategory {
    Core,
    Builder,
    Host,
    Web,
}

impl LogCategory {
    pub const ALL: [LogCategory; 4] = [
        LogCategory::Core,
        LogCategory::Builder,
        LogCategory::Host,
        LogCategory::Web,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Core => "shaderlink::core",
            LogCategory::Builder => "shaderlink::builder",
            LogCategory::Host => "shaderlink::host",
            LogCategory::Web => "shaderlink::web",
        }
    }
}

/// Global logger instance
static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Logger configuration and state
pub struct Logger {
    level: AtomicU8,
    enabled_categories: RwLock<Vec<LogCategory>>,
}

impl Logger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: AtomicU8::new(level as u8),
            enabled_categories: RwLock::new(LogCategory::ALL.to_vec()),
        }
    }

    pub fn with_categories(self, categories: Vec<LogCategory>) -> Self {
        *self.enabled_categories.write() = categories;
        self
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed))
    }

    pub fn is_enabled(&self, level: LogLevel, category: LogCategory) -> bool {
        level >= self.level() && self.enabled_categories.read().contains(&category)
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn enable_category(&self, category: LogCategory) {
        let mut categories = self.enabled_categories.write();
        if !categories.contains(&category) {
            categories.push(category);
        }
    }

    pub fn disable_category(&self, category: LogCategory) {
        self.enabled_categories.write().retain(|&c| c != category);
    }

    /// Replace the level and category switches with those in `config`
    pub fn apply(&self, config: &LoggingConfig) {
        self.set_level(config.level);
        *self.enabled_categories.write() = config.categories.clone();
    }
}

/// Convenience macros for structured logging
#[macro_export]
macro_rules! shaderlink_trace {
    ($category:expr, $($arg:tt)*) => {
        if $crate::logging::get_logger().is_enabled($crate::logging::LogLevel::Trace, $category) {
            ::tracing::trace!(target: $category.as_str(), $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! shaderlink_debug {
    ($category:expr, $($arg:tt)*) => {
        if $crate::logging::get_logger().is_enabled($crate::logging::LogLevel::Debug, $category) {
            ::tracing::debug!(target: $category.as_str(), $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! shaderlink_info {
    ($category:expr, $($arg:tt)*) => {
        if $crate::logging::get_logger().is_enabled($crate::logging::LogLevel::Info, $category) {
            ::tracing::info!(target: $category.as_str(), $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! shaderlink_warn {
    ($category:expr, $($arg:tt)*) => {
        if $crate::logging::get_logger().is_enabled($crate::logging::LogLevel::Warn, $category) {
            ::tracing::warn!(target: $category.as_str(), $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! shaderlink_error {
    ($category:expr, $($arg:tt)*) => {
        if $crate::logging::get_logger().is_enabled($crate::logging::LogLevel::Error, $category) {
            ::tracing::error!(target: $category.as_str(), $($arg)*);
        }
    };
}

/// Initialize the logging system with default settings
pub fn init() -> Result<()> {
    init_with(&LoggingConfig::default())
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over `config.filter`. Installing the
/// subscriber twice is an error; the category switches are configured the
/// first time either way.
pub fn init_with(config: &LoggingConfig) -> Result<()> {
    get_logger().apply(config);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .map_err(|e| ShaderlinkError::configuration(format!("Invalid log filter: {}", e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(config.with_target)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| ShaderlinkError::other(format!("Failed to install subscriber: {}", e)))
}

/// Get the global logger instance, creating it at `Info` if needed
pub fn get_logger() -> &'static Logger {
    LOGGER.get_or_init(|| Logger::new(LogLevel::Info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_logger_level_gate() {
        let logger = Logger::new(LogLevel::Warn);
        assert!(!logger.is_enabled(LogLevel::Debug, LogCategory::Builder));
        assert!(logger.is_enabled(LogLevel::Error, LogCategory::Builder));

        logger.set_level(LogLevel::Trace);
        assert_eq!(logger.level(), LogLevel::Trace);
        assert!(logger.is_enabled(LogLevel::Trace, LogCategory::Host));
    }

    #[test]
    fn test_logger_categories() {
        let logger = Logger::new(LogLevel::Info).with_categories(vec![LogCategory::Core]);
        assert!(!logger.is_enabled(LogLevel::Error, LogCategory::Web));

        logger.enable_category(LogCategory::Web);
        logger.enable_category(LogCategory::Web);
        assert!(logger.is_enabled(LogLevel::Error, LogCategory::Web));

        logger.disable_category(LogCategory::Core);
        assert!(!logger.is_enabled(LogLevel::Error, LogCategory::Core));
    }
}
