//! Storage abstraction shared by the PostgreSQL and in-memory backends
//!
//! Operations that touch an event's slot counter are expressed as single
//! store calls so each backend can run them under its own per-event lock:
//! a row lock inside a transaction for PostgreSQL, an async mutex in memory.
//! The rules themselves live on the models.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::models::*;
use crate::utils::errors::Result;

/// Result of a guarded registration mutation
#[derive(Debug, Clone)]
pub struct SlotChange {
    pub event: Event,
    pub registration: Registration,
    /// Set when a slot release was requested but the counter already sat at total
    pub clamped: bool,
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_user(&self, request: CreateUserRequest) -> Result<User>;
    async fn find_user(&self, user_id: i64) -> Result<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn list_users(&self) -> Result<Vec<User>>;

    async fn insert_event(&self, event: NewEvent) -> Result<Event>;
    async fn find_event(&self, event_id: i64) -> Result<Option<Event>>;
    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>>;
    async fn update_event_details(&self, event_id: i64, request: UpdateEventRequest) -> Result<Event>;

    /// Apply an event status transition under the event lock
    async fn transition_event(&self, event_id: i64, target: EventStatus) -> Result<Event>;

    /// Change an event's total capacity under the event lock
    async fn resize_event(&self, event_id: i64, new_total: i32) -> Result<Event>;

    /// Check the registration window, take a slot and create the registration, atomically
    async fn reserve_slot(
        &self,
        event_id: i64,
        user_id: i64,
        initial_status: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Result<SlotChange>;

    /// Apply a registration transition, releasing the slot if it stops consuming one
    async fn transition_registration(
        &self,
        registration_id: i64,
        target: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Result<SlotChange>;

    async fn find_registration(&self, registration_id: i64) -> Result<Option<Registration>>;
    async fn list_event_registrations(&self, event_id: i64) -> Result<Vec<Registration>>;
    async fn list_user_registrations(&self, user_id: i64) -> Result<Vec<Registration>>;

    async fn add_attachment(&self, attachment: NewAttachment) -> Result<EventAttachment>;
    async fn list_attachments(&self, event_id: i64) -> Result<Vec<EventAttachment>>;

    /// Backend liveness probe
    async fn health_check(&self) -> Result<()>;
}
