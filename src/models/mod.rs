//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod user;
pub mod event;
pub mod registration;

// Re-export commonly used models
pub use user::{User, UserRole, CreateUserRequest};
pub use event::{
    Event, EventStatus, CreateEventRequest, NewEvent, UpdateEventRequest, EventFilter,
    EventAttachment, AttachmentKind, NewAttachment, CapacitySummary,
};
pub use registration::{Registration, RegistrationStatus};
