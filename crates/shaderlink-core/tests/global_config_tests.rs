//! Global configuration and logger wiring. Kept to one test so nothing else
//! in this binary touches the globals concurrently.

use pretty_assertions::assert_eq;
use shaderlink_core::config::{self, ConfigManager};
use shaderlink_core::logging::{get_logger, LogCategory, LogLevel};
use shaderlink_core::{CleanupPolicy, ShaderlinkConfig};

#[test]
fn test_config_changes_reach_global_state() {
    let manager = ConfigManager::new();

    manager.set_log_level(LogLevel::Trace);
    assert_eq!(manager.get_config().logging.level, LogLevel::Trace);
    assert_eq!(get_logger().level(), LogLevel::Trace);
    assert!(get_logger().is_enabled(LogLevel::Trace, LogCategory::Builder));

    manager.update_config(|config| {
        config.logging.level = LogLevel::Warn;
        config.logging.categories = vec![LogCategory::Builder];
    });
    assert_eq!(get_logger().level(), LogLevel::Warn);
    assert!(get_logger().is_enabled(LogLevel::Error, LogCategory::Builder));
    assert!(!get_logger().is_enabled(LogLevel::Error, LogCategory::Web));

    // A second install replaces what an earlier one set up
    let first = config::init_config();
    assert_eq!(first.build_options().cleanup, CleanupPolicy::Retain);

    let mut replacement = ShaderlinkConfig::default();
    replacement.build.cleanup = CleanupPolicy::DeleteOnFailure;
    replacement.build.info_log_capacity = 64;
    let second = config::init_config_with(replacement.clone());

    assert!(std::ptr::eq(first, second));
    assert_eq!(second.get_config(), replacement);
    assert_eq!(
        config::get_config_manager().map(|manager| manager.build_options().cleanup),
        Some(CleanupPolicy::DeleteOnFailure)
    );
    assert_eq!(get_logger().level(), LogLevel::Info);
    assert!(get_logger().is_enabled(LogLevel::Info, LogCategory::Web));

    // `init` applies its configuration even when a subscriber is already set
    let mut late = ShaderlinkConfig::default();
    late.build.info_log_capacity = 32;
    let _ = shaderlink_core::init(late);
    assert_eq!(second.build_options().info_log_capacity, 32);
    let again = shaderlink_core::init(ShaderlinkConfig::default());
    assert!(again.is_err());
    assert_eq!(second.build_options().info_log_capacity, 512);
}
