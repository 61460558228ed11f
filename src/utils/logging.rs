//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging helpers
//! for event, signup and query activity.

use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::utils::errors::{Result, VoloConnectError};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer when dropped and must be held
/// for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| VoloConnectError::Config(format!("Invalid log filter: {}", e)))?;
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    let guard = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_ansi(false)
                        .with_writer(non_blocking),
                )
                .try_init()
                .map_err(|e| VoloConnectError::Config(e.to_string()))?;
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .try_init()
                .map_err(|e| VoloConnectError::Config(e.to_string()))?;
            None
        }
    };

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event registry actions
pub fn log_event_action(event_id: i64, action: &str, user_id: i64, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        details = details,
        "Event action performed"
    );
}

/// Log ledger actions on a single signup
pub fn log_signup_action(signup_id: i64, event_id: i64, action: &str, user_id: i64, status: &str) {
    info!(
        signup_id = signup_id,
        event_id = event_id,
        action = action,
        user_id = user_id,
        status = status,
        "Signup action performed"
    );
}

/// Log Q&A actions
pub fn log_query_action(query_id: i64, event_id: i64, action: &str, user_id: i64) {
    info!(
        query_id = query_id,
        event_id = event_id,
        action = action,
        user_id = user_id,
        "Query action performed"
    );
}

/// Log a rejected request; authorization failures are surfaced as warnings
pub fn log_denied(operation: &str, user_id: i64, reason: &str) {
    warn!(
        operation = operation,
        user_id = user_id,
        reason = reason,
        "Operation denied"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
