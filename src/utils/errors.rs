//! Error handling for EventDesk
//!
//! This module defines the main error type used throughout the application
//! and provides a unified error handling strategy.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Main error type for EventDesk application
#[derive(Error, Debug)]
pub enum EventDeskError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Registration not found: {registration_id}")]
    RegistrationNotFound { registration_id: i64 },

    #[error("Event {event_id} has no available slots")]
    CapacityExceeded { event_id: i64 },

    #[error("Registration for event {event_id} closed at {deadline}")]
    DeadlineExpired { event_id: i64, deadline: DateTime<Utc> },

    #[error("Event {event_id} is not open for registration (status: {status})")]
    EventNotApproved { event_id: i64, status: String },

    #[error("Registration {registration_id} is already cancelled")]
    AlreadyCancelled { registration_id: i64 },

    #[error("User {user_id} is already registered for event {event_id}")]
    AlreadyRegistered { event_id: i64, user_id: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for EventDesk operations
pub type Result<T> = std::result::Result<T, EventDeskError>;

impl From<config::ConfigError> for EventDeskError {
    fn from(err: config::ConfigError) -> Self {
        EventDeskError::Config(err.to_string())
    }
}

impl EventDeskError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            EventDeskError::Database(_) => false,
            EventDeskError::Migration(_) => false,
            EventDeskError::Config(_) => false,
            EventDeskError::Serialization(_) => false,
            EventDeskError::Io(_) => true,
            EventDeskError::PermissionDenied(_)
            | EventDeskError::UserNotFound { .. }
            | EventDeskError::EventNotFound { .. }
            | EventDeskError::RegistrationNotFound { .. }
            | EventDeskError::CapacityExceeded { .. }
            | EventDeskError::DeadlineExpired { .. }
            | EventDeskError::EventNotApproved { .. }
            | EventDeskError::AlreadyCancelled { .. }
            | EventDeskError::AlreadyRegistered { .. }
            | EventDeskError::InvalidStateTransition { .. }
            | EventDeskError::InvalidInput(_) => true,
        }
    }

    /// Whether the error is a business-rule rejection rather than an infrastructure failure
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            EventDeskError::CapacityExceeded { .. }
                | EventDeskError::DeadlineExpired { .. }
                | EventDeskError::EventNotApproved { .. }
                | EventDeskError::AlreadyCancelled { .. }
                | EventDeskError::AlreadyRegistered { .. }
                | EventDeskError::InvalidStateTransition { .. }
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EventDeskError::Database(_) => ErrorSeverity::Critical,
            EventDeskError::Migration(_) => ErrorSeverity::Critical,
            EventDeskError::Config(_) => ErrorSeverity::Critical,
            EventDeskError::PermissionDenied(_) => ErrorSeverity::Warning,
            EventDeskError::InvalidInput(_) => ErrorSeverity::Info,
            err if err.is_rejection() => ErrorSeverity::Info,
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

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rejections_are_recoverable() {
        let err = EventDeskError::CapacityExceeded { event_id: 1 };
        assert!(err.is_recoverable());
        assert!(err.is_rejection());
        assert_eq!(err.severity(), ErrorSeverity::Info);
        assert_eq!(err.to_string(), "Event 1 has no available slots");
    }

    #[test]
    fn test_config_errors_are_critical() {
        let err = EventDeskError::Config("missing url".to_string());
        assert!(!err.is_recoverable());
        assert!(!err.is_rejection());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_permission_denied_is_warning() {
        let err = EventDeskError::PermissionDenied("attendees cannot create events".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }
}
