//! Configuration validation module
//!
//! Validation functions run once at startup so that misconfiguration fails
//! before any connection is opened.

use super::Settings;
use crate::utils::errors::{Result, VoloConnectError};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_logging_config(&settings.logging)?;
    validate_notification_config(&settings.notifications)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(VoloConnectError::Config(
            "Database URL is required".to_string()
        ));
    }

    if !config.url.starts_with("postgres://") && !config.url.starts_with("postgresql://") {
        return Err(VoloConnectError::Config(
            "Database URL must use the postgres:// or postgresql:// scheme".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(VoloConnectError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(VoloConnectError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(VoloConnectError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(VoloConnectError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    if config.directory.is_some() && config.file_prefix.is_empty() {
        return Err(VoloConnectError::Config(
            "Log file prefix is required when a log directory is set".to_string()
        ));
    }

    Ok(())
}

/// Validate notification configuration
fn validate_notification_config(config: &super::NotificationConfig) -> Result<()> {
    if let Some(url) = &config.webhook_url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(VoloConnectError::Config(
                format!("Notification webhook must be an http(s) URL: {}", url)
            ));
        }
    }

    if config.timeout_seconds == 0 {
        return Err(VoloConnectError::Config(
            "Notification timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_rejects_bad_pool_bounds() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert_matches!(validate_settings(&settings), Err(VoloConnectError::Config(_)));
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut settings = Settings::default();
        settings.logging.level = "verbose".to_string();
        assert_matches!(validate_settings(&settings), Err(VoloConnectError::Config(msg)) if msg.contains("verbose"));
    }

    #[test]
    fn test_rejects_non_http_webhook() {
        let mut settings = Settings::default();
        settings.notifications.webhook_url = Some("ftp://example.org/hook".to_string());
        assert!(validate_settings(&settings).is_err());

        settings.notifications.webhook_url = Some("https://example.org/hook".to_string());
        assert!(validate_settings(&settings).is_ok());
    }
}
