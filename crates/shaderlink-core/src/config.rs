//! Configuration system for Shaderlink

use crate::builder::{BuildOptions, CleanupPolicy, DEFAULT_INFO_LOG_CAPACITY};
use crate::logging::{get_logger, LogCategory, LogLevel};
use parking_lot::RwLock;
use std::sync::OnceLock;

#[cfg(feature = "serde")]
use crate::error::{Result, ShaderlinkError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Global configuration for Shaderlink
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShaderlinkConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Shader program build settings
    pub build: BuildConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoggingConfig {
    /// Minimum level for the category-gated macros
    pub level: LogLevel,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Categories whose messages are emitted
    pub categories: Vec<LogCategory>,
    /// Print the event target
    pub with_target: bool,
}

/// Shader program build settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildConfig {
    /// Size of the diagnostic log buffer, terminator included
    pub info_log_capacity: usize,
    /// Host object cleanup after a build
    pub cleanup: CleanupPolicy,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            filter: "info".to_string(),
            categories: LogCategory::ALL.to_vec(),
            with_target: true,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            info_log_capacity: DEFAULT_INFO_LOG_CAPACITY,
            cleanup: CleanupPolicy::Retain,
        }
    }
}

impl From<&BuildConfig> for BuildOptions {
    fn from(config: &BuildConfig) -> Self {
        BuildOptions {
            info_log_capacity: config.info_log_capacity,
            cleanup: config.cleanup,
        }
    }
}

#[cfg(feature = "serde")]
impl ShaderlinkConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| ShaderlinkError::configuration(format!("Invalid JSON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a RON document; missing fields take their defaults
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)
            .map_err(|e| ShaderlinkError::configuration(format!("Invalid RON config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file, picking the format from its extension
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("ron") => Self::from_ron(&text),
            other => Err(ShaderlinkError::configuration(format!(
                "Unsupported config extension {:?} for {}",
                other,
                path.display()
            ))),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ShaderlinkError::configuration(e.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.build.info_log_capacity == 0 {
            return Err(ShaderlinkError::configuration(
                "build.info_log_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Global configuration manager
pub struct ConfigManager {
    config: RwLock<ShaderlinkConfig>,
}

impl ConfigManager {
    /// Create a new configuration manager with default settings
    pub fn new() -> Self {
        Self::with_config(ShaderlinkConfig::default())
    }

    /// Create a configuration manager with custom config
    pub fn with_config(config: ShaderlinkConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Get a copy of the current configuration
    pub fn get_config(&self) -> ShaderlinkConfig {
        self.config.read().clone()
    }

    /// Update the configuration. The resulting logging settings are pushed
    /// to the global logger.
    pub fn update_config<F>(&self, updater: F)
    where
        F: FnOnce(&mut ShaderlinkConfig),
    {
        let mut config = self.config.write();
        updater(&mut *config);
        get_logger().apply(&config.logging);
    }

    /// Build options derived from the current build settings
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions::from(&self.config.read().build)
    }

    pub fn set_cleanup_policy(&self, policy: CleanupPolicy) {
        self.config.write().build.cleanup = policy;
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.config.write().logging.level = level;
        get_logger().set_level(level);
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Global configuration instance
static CONFIG_MANAGER: OnceLock<ConfigManager> = OnceLock::new();

/// Initialize the global configuration manager
pub fn init_config() -> &'static ConfigManager {
    CONFIG_MANAGER.get_or_init(ConfigManager::new)
}

/// Initialize the global configuration manager with custom config.
///
/// If the manager already exists its configuration is replaced.
pub fn init_config_with(config: ShaderlinkConfig) -> &'static ConfigManager {
    let mut pending = Some(config);
    let manager = CONFIG_MANAGER
        .get_or_init(|| ConfigManager::with_config(pending.take().unwrap_or_default()));
    if let Some(config) = pending {
        manager.update_config(|current| *current = config);
    }
    manager
}

/// Get the global configuration manager
pub fn get_config_manager() -> Option<&'static ConfigManager> {
    CONFIG_MANAGER.get()
}
