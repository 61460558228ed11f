//! Error handling for VoloConnect
//!
//! This module defines the error type surfaced by every core operation.
//! Domain kinds (validation, authorization, not-found, conflict, capacity,
//! state) are what the calling layer maps to responses; the remaining
//! variants wrap infrastructure failures.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Main error type for VoloConnect operations
#[derive(Error, Debug)]
pub enum VoloConnectError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Event {event_id} is full ({max_volunteers} volunteers)")]
    Capacity { event_id: i64, max_volunteers: i32 },

    #[error("Invalid state transition: {from} -> {to}")]
    State { from: String, to: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for VoloConnect operations
pub type Result<T> = std::result::Result<T, VoloConnectError>;

/// Per-field validation messages, kept in field order for stable output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Turn the collected messages into an error, or `Ok` when nothing failed
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(VoloConnectError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Coarse error classification for the calling layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authorization,
    NotFound,
    Conflict,
    Capacity,
    State,
    Internal,
}

impl VoloConnectError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        VoloConnectError::NotFound { entity, id }
    }

    pub fn invalid_transition(from: impl fmt::Display, to: impl fmt::Display) -> Self {
        VoloConnectError::State {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, message);
        VoloConnectError::Validation(errors)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            VoloConnectError::Validation(_) => ErrorKind::Validation,
            VoloConnectError::Authorization(_) => ErrorKind::Authorization,
            VoloConnectError::NotFound { .. } => ErrorKind::NotFound,
            VoloConnectError::Conflict(_) => ErrorKind::Conflict,
            VoloConnectError::Capacity { .. } => ErrorKind::Capacity,
            VoloConnectError::State { .. } => ErrorKind::State,
            _ => ErrorKind::Internal,
        }
    }

    /// Check if the error is recoverable by retrying the same call
    pub fn is_recoverable(&self) -> bool {
        match self {
            VoloConnectError::Database(sqlx::Error::PoolTimedOut) => true,
            VoloConnectError::Database(sqlx::Error::Io(_)) => true,
            VoloConnectError::Http(_) => true,
            VoloConnectError::Io(_) => true,
            _ => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            VoloConnectError::Database(_) => ErrorSeverity::Critical,
            VoloConnectError::Migration(_) => ErrorSeverity::Critical,
            VoloConnectError::Config(_) => ErrorSeverity::Critical,
            VoloConnectError::Authorization(_) => ErrorSeverity::Warning,
            VoloConnectError::Validation(_) => ErrorSeverity::Info,
            VoloConnectError::NotFound { .. } => ErrorSeverity::Info,
            VoloConnectError::Conflict(_) => ErrorSeverity::Info,
            VoloConnectError::Capacity { .. } => ErrorSeverity::Info,
            VoloConnectError::State { .. } => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
