//! Test helpers module
//!
//! Builds service stacks over the in-memory store and seeds users and events.

#![allow(dead_code)]

pub mod database_helper;

use std::sync::Arc;
use chrono::{Duration, Utc};
use EventDesk::config::Settings;
use EventDesk::database::MemoryStore;
use EventDesk::models::{CreateEventRequest, CreateUserRequest, Event, User, UserRole};
use EventDesk::services::ServiceFactory;

/// Service stack plus a few seeded users
pub struct TestContext {
    pub services: ServiceFactory<MemoryStore>,
    pub admin: User,
    pub organizer: User,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_settings(Settings::default()).await
    }

    pub async fn with_settings(settings: Settings) -> Self {
        let services = ServiceFactory::new(Arc::new(MemoryStore::new()), &settings);
        let admin = create_user(&services, "admin", UserRole::Admin).await;
        let organizer = create_user(&services, "organizer", UserRole::Organizer).await;
        Self { services, admin, organizer }
    }

    pub async fn attendee(&self, username: &str) -> User {
        create_user(&self.services, username, UserRole::Attendee).await
    }

    /// Organizer-created event, submitted and approved by the admin
    pub async fn approved_event(&self, total_slots: i32) -> Event {
        let event = self
            .services
            .event_service
            .create_event(self.organizer.id, event_request("Approved event", total_slots, true))
            .await
            .expect("Failed to create event");
        self.services
            .event_service
            .approve(self.admin.id, event.id)
            .await
            .expect("Failed to approve event")
    }

    pub async fn pending_event(&self, total_slots: i32) -> Event {
        self.services
            .event_service
            .create_event(self.organizer.id, event_request("Pending event", total_slots, true))
            .await
            .expect("Failed to create event")
    }

    pub async fn available_slots(&self, event_id: i64) -> i32 {
        self.services
            .event_service
            .get_event(event_id)
            .await
            .expect("Event should exist")
            .available_slots
    }
}

pub async fn create_user(services: &ServiceFactory<MemoryStore>, username: &str, role: UserRole) -> User {
    services
        .user_service
        .create_user(CreateUserRequest {
            username: username.to_string(),
            full_name: format!("Test {}", username),
            email: format!("{}@example.com", username),
            role,
        })
        .await
        .expect("Failed to create test user")
}

pub fn event_request(title: &str, total_slots: i32, submit_for_approval: bool) -> CreateEventRequest {
    let now = Utc::now();
    CreateEventRequest {
        title: title.to_string(),
        description: Some("Integration test event".to_string()),
        category: Some("conference".to_string()),
        venue: Some("Hall A".to_string()),
        event_date: now + Duration::days(14),
        registration_deadline: now + Duration::days(7),
        total_slots,
        submit_for_approval,
    }
}
