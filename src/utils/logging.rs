//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the EventDesk application.

use tracing::{info, warn, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use crate::config::LoggingConfig;
use crate::utils::errors::{EventDeskError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_new(&config.level)
        .map_err(|e| EventDeskError::Config(format!("Invalid log filter: {}", e)))?;

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let file_appender = tracing_appender::rolling::daily(directory, "eventdesk.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().with_ansi(false).with_writer(non_blocking)), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    let initialized = if config.json {
        registry.with(fmt::layer().json().with_writer(std::io::stdout)).try_init()
    } else {
        registry.with(fmt::layer().with_writer(std::io::stdout)).try_init()
    };
    initialized.map_err(|e| EventDeskError::Config(format!("Logging already initialized: {}", e)))?;

    info!(level = %config.level, json = config.json, "Logging initialized");
    Ok(guard)
}

/// Log event lifecycle actions
pub fn log_event_action(event_id: i64, action: &str, actor_id: Option<i64>, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        actor_id = actor_id,
        details = details,
        "Event action performed"
    );
}

/// Log registration actions
pub fn log_registration_action(registration_id: i64, event_id: i64, user_id: i64, action: &str) {
    info!(
        registration_id = registration_id,
        event_id = event_id,
        user_id = user_id,
        action = action,
        "Registration action performed"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log slot counter movements
pub fn log_capacity_change(event_id: i64, available_slots: i32, total_slots: i32, reason: &str) {
    debug!(
        event_id = event_id,
        available_slots = available_slots,
        total_slots = total_slots,
        reason = reason,
        "Event capacity changed"
    );
}
