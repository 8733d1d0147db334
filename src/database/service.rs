//! Database service layer
//!
//! PostgreSQL implementation of [`EventStore`] built from the repositories

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::database::{DatabasePool, UserRepository, EventRepository, RegistrationRepository};
use crate::database::store::{EventStore, SlotChange};
use crate::models::*;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub users: UserRepository,
    pub events: EventRepository,
    pub registrations: RegistrationRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            events: EventRepository::new(pool.clone()),
            registrations: RegistrationRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}

#[async_trait]
impl EventStore for DatabaseService {
    async fn insert_user(&self, request: CreateUserRequest) -> Result<User> {
        self.users.create(request).await
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        self.users.find_by_id(user_id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users.find_by_username(username).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.users.list().await
    }

    async fn insert_event(&self, event: NewEvent) -> Result<Event> {
        self.events.create(event).await
    }

    async fn find_event(&self, event_id: i64) -> Result<Option<Event>> {
        self.events.find_by_id(event_id).await
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        self.events.list(filter).await
    }

    async fn update_event_details(&self, event_id: i64, request: UpdateEventRequest) -> Result<Event> {
        self.events.update(event_id, request).await
    }

    async fn transition_event(&self, event_id: i64, target: EventStatus) -> Result<Event> {
        self.events.transition(event_id, target).await
    }

    async fn resize_event(&self, event_id: i64, new_total: i32) -> Result<Event> {
        self.events.resize(event_id, new_total).await
    }

    async fn reserve_slot(
        &self,
        event_id: i64,
        user_id: i64,
        initial_status: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Result<SlotChange> {
        self.registrations.reserve(event_id, user_id, initial_status, now).await
    }

    async fn transition_registration(
        &self,
        registration_id: i64,
        target: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Result<SlotChange> {
        self.registrations.transition(registration_id, target, now).await
    }

    async fn find_registration(&self, registration_id: i64) -> Result<Option<Registration>> {
        self.registrations.find_by_id(registration_id).await
    }

    async fn list_event_registrations(&self, event_id: i64) -> Result<Vec<Registration>> {
        self.registrations.get_for_event(event_id).await
    }

    async fn list_user_registrations(&self, user_id: i64) -> Result<Vec<Registration>> {
        self.registrations.get_for_user(user_id).await
    }

    async fn add_attachment(&self, attachment: NewAttachment) -> Result<EventAttachment> {
        self.events.add_attachment(attachment).await
    }

    async fn list_attachments(&self, event_id: i64) -> Result<Vec<EventAttachment>> {
        self.events.get_attachments(event_id).await
    }

    async fn health_check(&self) -> Result<()> {
        crate::database::connection::health_check(&self.pool).await
    }
}
