//! EventDesk
//!
//! Event management back end: users create, approve, browse and register for
//! events. This library provides the event and registration models with their
//! status machines, the capacity tracker guarding each event's slot counter,
//! PostgreSQL and in-memory storage, and a console command layer.

#![allow(non_snake_case)]

pub mod config;
pub mod handlers;
pub mod services;
pub mod models;
pub mod database;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{EventDeskError, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, EventStore, MemoryStore};
pub use services::{CapacityTracker, EventService, ServiceFactory, UserService};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
