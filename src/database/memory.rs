//! In-process store
//!
//! Every event owns an async mutex guarding the event row together with its
//! registrations, so all slot mutations for one event are serialized while
//! different events proceed independently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use crate::database::store::{EventStore, SlotChange};
use crate::models::*;
use crate::utils::errors::{EventDeskError, Result};

struct EventEntry {
    event: Event,
    registrations: Vec<Registration>,
}

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<i64, User>>,
    events: RwLock<HashMap<i64, Arc<Mutex<EventEntry>>>>,
    // registration id -> event id
    registration_index: RwLock<HashMap<i64, i64>>,
    attachments: RwLock<HashMap<i64, Vec<EventAttachment>>>,
    user_ids: AtomicI64,
    event_ids: AtomicI64,
    registration_ids: AtomicI64,
    attachment_ids: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(counter: &AtomicI64) -> i64 {
        counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn entry(&self, event_id: i64) -> Result<Arc<Mutex<EventEntry>>> {
        self.events
            .read()
            .await
            .get(&event_id)
            .cloned()
            .ok_or(EventDeskError::EventNotFound { event_id })
    }

    async fn entry_for_registration(&self, registration_id: i64) -> Result<Arc<Mutex<EventEntry>>> {
        let event_id = self
            .registration_index
            .read()
            .await
            .get(&registration_id)
            .copied()
            .ok_or(EventDeskError::RegistrationNotFound { registration_id })?;
        self.entry(event_id).await
    }

    async fn all_entries(&self) -> Vec<Arc<Mutex<EventEntry>>> {
        self.events.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_user(&self, request: CreateUserRequest) -> Result<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == request.username) {
            return Err(EventDeskError::InvalidInput(format!("Username already taken: {}", request.username)));
        }
        let user = User {
            id: Self::next_id(&self.user_ids),
            username: request.username,
            full_name: request.full_name,
            email: request.email,
            role: request.role,
            created_at: Utc::now(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, user_id: i64) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn insert_event(&self, new_event: NewEvent) -> Result<Event> {
        let now = Utc::now();
        let event = Event {
            id: Self::next_id(&self.event_ids),
            title: new_event.title,
            description: new_event.description,
            category: new_event.category,
            venue: new_event.venue,
            organizer_id: new_event.organizer_id,
            event_date: new_event.event_date,
            registration_deadline: new_event.registration_deadline,
            total_slots: new_event.total_slots,
            available_slots: new_event.total_slots,
            status: new_event.status,
            created_at: now,
            updated_at: now,
        };
        let entry = EventEntry { event: event.clone(), registrations: Vec::new() };
        self.events.write().await.insert(event.id, Arc::new(Mutex::new(entry)));
        debug!(event_id = event.id, "Event stored in memory");
        Ok(event)
    }

    async fn find_event(&self, event_id: i64) -> Result<Option<Event>> {
        match self.entry(event_id).await {
            Ok(entry) => Ok(Some(entry.lock().await.event.clone())),
            Err(EventDeskError::EventNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        let now = Utc::now();
        let mut events = Vec::new();
        for entry in self.all_entries().await {
            let entry = entry.lock().await;
            if filter.matches(&entry.event, now) {
                events.push(entry.event.clone());
            }
        }
        events.sort_by(|a, b| a.event_date.cmp(&b.event_date).then(a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn update_event_details(&self, event_id: i64, request: UpdateEventRequest) -> Result<Event> {
        let entry = self.entry(event_id).await?;
        let mut entry = entry.lock().await;
        entry.event.apply_details(request, Utc::now())?;
        Ok(entry.event.clone())
    }


    async fn transition_event(&self, event_id: i64, target: EventStatus) -> Result<Event> {
        let entry = self.entry(event_id).await?;
        let mut entry = entry.lock().await;
        entry.event.transition_to(target)?;
        entry.event.updated_at = Utc::now();
        Ok(entry.event.clone())
    }

    async fn resize_event(&self, event_id: i64, new_total: i32) -> Result<Event> {
        let entry = self.entry(event_id).await?;
        let mut entry = entry.lock().await;
        entry.event.resize(new_total)?;
        entry.event.updated_at = Utc::now();
        Ok(entry.event.clone())
    }

    async fn reserve_slot(
        &self,
        event_id: i64,
        user_id: i64,
        initial_status: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Result<SlotChange> {
        let entry = self.entry(event_id).await?;
        let mut entry = entry.lock().await;

        entry.event.ensure_open_for_registration(now)?;
        if entry.registrations.iter().any(|r| r.user_id == user_id && r.is_active()) {
            return Err(EventDeskError::AlreadyRegistered { event_id, user_id });
        }
        entry.event.reserve_slot()?;
        entry.event.updated_at = now;

        let registration = Registration {
            id: Self::next_id(&self.registration_ids),
            event_id,
            user_id,
            registered_at: now,
            status: initial_status,
            checked_in: false,
            updated_at: now,
        };
        entry.registrations.push(registration.clone());
        self.registration_index.write().await.insert(registration.id, event_id);

        Ok(SlotChange { event: entry.event.clone(), registration, clamped: false })
    }

    async fn transition_registration(
        &self,
        registration_id: i64,
        target: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Result<SlotChange> {
        let entry = self.entry_for_registration(registration_id).await?;
        let mut entry = entry.lock().await;
        let EventEntry { event, registrations } = &mut *entry;

        let registration = registrations
            .iter_mut()
            .find(|r| r.id == registration_id)
            .ok_or(EventDeskError::RegistrationNotFound { registration_id })?;

        let releases_slot = registration.transition_to(target, now)?;
        let clamped = releases_slot && !event.release_slot();
        if releases_slot {
            event.updated_at = now;
        }

        Ok(SlotChange { event: event.clone(), registration: registration.clone(), clamped })
    }

    async fn find_registration(&self, registration_id: i64) -> Result<Option<Registration>> {
        let entry = match self.entry_for_registration(registration_id).await {
            Ok(entry) => entry,
            Err(EventDeskError::RegistrationNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let entry = entry.lock().await;
        Ok(entry.registrations.iter().find(|r| r.id == registration_id).cloned())
    }

    async fn list_event_registrations(&self, event_id: i64) -> Result<Vec<Registration>> {
        let entry = self.entry(event_id).await?;
        let entry = entry.lock().await;
        Ok(entry.registrations.clone())
    }

    async fn list_user_registrations(&self, user_id: i64) -> Result<Vec<Registration>> {
        let mut registrations = Vec::new();
        for entry in self.all_entries().await {
            let entry = entry.lock().await;
            registrations.extend(entry.registrations.iter().filter(|r| r.user_id == user_id).cloned());
        }
        registrations.sort_by_key(|r| r.registered_at);
        Ok(registrations)
    }

    async fn add_attachment(&self, attachment: NewAttachment) -> Result<EventAttachment> {
        // Existence check only; attachments never touch the slot counter
        self.entry(attachment.event_id).await?;
        let stored = EventAttachment {
            id: Self::next_id(&self.attachment_ids),
            event_id: attachment.event_id,
            kind: attachment.kind,
            file_name: attachment.file_name,
            content_type: attachment.content_type,
            data: attachment.data,
            created_at: Utc::now(),
        };
        self.attachments
            .write()
            .await
            .entry(stored.event_id)
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn list_attachments(&self, event_id: i64) -> Result<Vec<EventAttachment>> {
        Ok(self.attachments.read().await.get(&event_id).cloned().unwrap_or_default())
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
