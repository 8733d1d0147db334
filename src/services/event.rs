//! Event service implementation
//!
//! This service handles event creation, role checks for lifecycle actions,
//! descriptive edits and attachments. Slot-affecting work is delegated to the
//! [`CapacityTracker`].

use std::sync::Arc;
use chrono::Utc;
use tracing::{debug, info, warn};
use crate::database::store::EventStore;
use crate::models::*;
use crate::services::capacity::CapacityTracker;
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::{normalize_whitespace, sanitize_filename};
use crate::utils::logging::{log_admin_action, log_event_action};

/// Largest attachment accepted, in bytes
pub const MAX_ATTACHMENT_BYTES: usize = 10 * 1024 * 1024;

pub struct EventService<S> {
    store: Arc<S>,
    tracker: CapacityTracker<S>,
}

impl<S> Clone for EventService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            tracker: self.tracker.clone(),
        }
    }
}

impl<S: EventStore> EventService<S> {
    pub fn new(store: Arc<S>, tracker: CapacityTracker<S>) -> Self {
        Self { store, tracker }
    }

    async fn actor(&self, actor_id: i64) -> Result<User> {
        self.store
            .find_user(actor_id)
            .await?
            .ok_or(EventDeskError::UserNotFound { user_id: actor_id })
    }

    /// Get event by ID
    pub async fn get_event(&self, event_id: i64) -> Result<Event> {
        self.store
            .find_event(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })
    }

    fn ensure_can_manage(actor: &User, event: &Event) -> Result<()> {
        if actor.is_admin() || actor.id == event.organizer_id {
            Ok(())
        } else {
            warn!(user_id = actor.id, event_id = event.id, "User attempted to manage an event they do not own");
            Err(EventDeskError::PermissionDenied(format!(
                "User {} cannot manage event {}",
                actor.id, event.id
            )))
        }
    }

    fn ensure_admin(actor: &User, action: &str) -> Result<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(EventDeskError::PermissionDenied(format!("Only admins can {} events", action)))
        }
    }

    /// Create an event; the initial status depends on the creator's role
    pub async fn create_event(&self, actor_id: i64, request: CreateEventRequest) -> Result<Event> {
        debug!(actor_id = actor_id, title = %request.title, "Creating event");
        let actor = self.actor(actor_id).await?;

        if !actor.role.can_create_events() {
            return Err(EventDeskError::PermissionDenied(format!(
                "Users with role {} cannot create events",
                actor.role
            )));
        }

        let title = normalize_whitespace(&request.title);
        if title.is_empty() {
            return Err(EventDeskError::InvalidInput("Event title is required".to_string()));
        }
        if request.total_slots < 1 {
            return Err(EventDeskError::InvalidInput("Total slots must be at least 1".to_string()));
        }
        if request.registration_deadline > request.event_date {
            return Err(EventDeskError::InvalidInput(
                "Registration deadline cannot be after the event date".to_string(),
            ));
        }

        let status = match actor.role {
            UserRole::Admin => EventStatus::Approved,
            _ if request.submit_for_approval => EventStatus::Pending,
            _ => EventStatus::Draft,
        };

        let event = self
            .store
            .insert_event(NewEvent {
                title,
                description: request.description,
                category: request.category,
                venue: request.venue,
                organizer_id: actor.id,
                event_date: request.event_date,
                registration_deadline: request.registration_deadline,
                total_slots: request.total_slots,
                status,
            })
            .await?;

        log_event_action(event.id, "create", Some(actor.id), Some(status.as_str()));
        Ok(event)
    }

    /// Draft -> Pending
    pub async fn submit(&self, actor_id: i64, event_id: i64) -> Result<Event> {
        let actor = self.actor(actor_id).await?;
        let event = self.get_event(event_id).await?;
        Self::ensure_can_manage(&actor, &event)?;

        let event = self.store.transition_event(event_id, EventStatus::Pending).await?;
        log_event_action(event_id, "submit", Some(actor_id), None);
        Ok(event)
    }

    /// Approve a pending event (admin only)
    pub async fn approve(&self, actor_id: i64, event_id: i64) -> Result<Event> {
        let actor = self.actor(actor_id).await?;
        Self::ensure_admin(&actor, "approve")?;

        let event = self.tracker.approve_event(event_id).await?;
        log_admin_action(actor_id, "approve_event", Some(&event.title), None);
        Ok(event)
    }

    /// Reject a pending event (admin only)
    pub async fn reject(&self, actor_id: i64, event_id: i64) -> Result<Event> {
        let actor = self.actor(actor_id).await?;
        Self::ensure_admin(&actor, "reject")?;

        let event = self.tracker.reject_event(event_id).await?;
        log_admin_action(actor_id, "reject_event", Some(&event.title), None);
        Ok(event)
    }

    /// Approved -> Cancelled. Registrations are kept as they are.
    pub async fn cancel_event(&self, actor_id: i64, event_id: i64) -> Result<Event> {
        let actor = self.actor(actor_id).await?;
        let event = self.get_event(event_id).await?;
        Self::ensure_can_manage(&actor, &event)?;

        let event = self.store.transition_event(event_id, EventStatus::Cancelled).await?;
        log_event_action(event_id, "cancel", Some(actor_id), None);
        Ok(event)
    }

    /// Approved -> Completed
    pub async fn complete(&self, actor_id: i64, event_id: i64) -> Result<Event> {
        let actor = self.actor(actor_id).await?;
        let event = self.get_event(event_id).await?;
        Self::ensure_can_manage(&actor, &event)?;

        let event = self.store.transition_event(event_id, EventStatus::Completed).await?;
        log_event_action(event_id, "complete", Some(actor_id), None);
        Ok(event)
    }

    /// Edit descriptive fields of a non-terminal event
    pub async fn update_details(&self, actor_id: i64, event_id: i64, mut request: UpdateEventRequest) -> Result<Event> {
        let actor = self.actor(actor_id).await?;
        let event = self.get_event(event_id).await?;
        Self::ensure_can_manage(&actor, &event)?;

        if let Some(title) = request.title.as_deref() {
            let title = normalize_whitespace(title);
            if title.is_empty() {
                return Err(EventDeskError::InvalidInput("Event title is required".to_string()));
            }
            request.title = Some(title);
        }

        // Status and date checks run in the store under the event lock
        let event = self.store.update_event_details(event_id, request).await?;
        log_event_action(event_id, "update", Some(actor_id), None);
        Ok(event)
    }

    /// Change the number of slots of an event
    pub async fn resize(&self, actor_id: i64, event_id: i64, new_total: i32) -> Result<Event> {
        let actor = self.actor(actor_id).await?;
        let event = self.get_event(event_id).await?;
        Self::ensure_can_manage(&actor, &event)?;

        self.tracker.resize(event_id, new_total).await
    }

    /// Attach an image or document to an event
    pub async fn add_attachment(
        &self,
        actor_id: i64,
        event_id: i64,
        kind: AttachmentKind,
        file_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<EventAttachment> {
        let actor = self.actor(actor_id).await?;
        let event = self.get_event(event_id).await?;
        Self::ensure_can_manage(&actor, &event)?;

        if content_type.trim().is_empty() || !content_type.contains('/') {
            return Err(EventDeskError::InvalidInput(format!("Invalid content type: {:?}", content_type)));
        }
        if kind == AttachmentKind::Image && !content_type.starts_with("image/") {
            return Err(EventDeskError::InvalidInput(format!(
                "Image attachments need an image/* content type, got {}",
                content_type
            )));
        }
        if data.is_empty() || data.len() > MAX_ATTACHMENT_BYTES {
            return Err(EventDeskError::InvalidInput(format!(
                "Attachment size must be between 1 and {} bytes",
                MAX_ATTACHMENT_BYTES
            )));
        }

        let attachment = self
            .store
            .add_attachment(NewAttachment {
                event_id,
                kind,
                file_name: sanitize_filename(file_name),
                content_type: content_type.trim().to_string(),
                data,
            })
            .await?;

        info!(event_id = event_id, attachment_id = attachment.id, size = attachment.data.len(), "Attachment stored");
        Ok(attachment)
    }

    pub async fn attachments(&self, event_id: i64) -> Result<Vec<EventAttachment>> {
        self.get_event(event_id).await?;
        self.store.list_attachments(event_id).await
    }

    /// List events matching the filter, ordered by date
    pub async fn list_events(&self, filter: &EventFilter) -> Result<Vec<Event>> {
        self.store.list_events(filter).await
    }

    /// Approved events still accepting registrations
    pub async fn open_events(&self) -> Result<Vec<Event>> {
        let now = Utc::now();
        let filter = EventFilter { status: Some(EventStatus::Approved), upcoming_only: true, ..Default::default() };
        let events = self.store.list_events(&filter).await?;
        Ok(events.into_iter().filter(|e| e.registration_deadline >= now).collect())
    }

    /// Per-user overview: registrations and organized events
    pub async fn dashboard(&self, user_id: i64) -> Result<serde_json::Value> {
        let user = self.actor(user_id).await?;
        let registrations = self.store.list_user_registrations(user_id).await?;
        let organized = self
            .store
            .list_events(&EventFilter { organizer_id: Some(user_id), ..Default::default() })
            .await?;

        Ok(serde_json::json!({
            "user": user,
            "registrations": registrations,
            "organized_events": organized,
        }))
    }
}
