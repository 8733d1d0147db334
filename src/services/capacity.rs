//! Capacity tracker
//!
//! The only entry point allowed to move an event's available-slot counter.
//! Every mutation goes through a single guarded store call, so concurrent
//! callers racing for the last slot cannot both succeed.

use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use crate::config::RegistrationConfig;
use crate::database::store::{EventStore, SlotChange};
use crate::models::{CapacitySummary, Event, EventStatus, Registration, RegistrationStatus};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::logging::{log_capacity_change, log_event_action, log_registration_action};

pub struct CapacityTracker<S> {
    store: Arc<S>,
    config: RegistrationConfig,
}

impl<S> Clone for CapacityTracker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S: EventStore> CapacityTracker<S> {
    pub fn new(store: Arc<S>, config: RegistrationConfig) -> Self {
        Self { store, config }
    }

    /// Register a user for an event, taking one slot
    pub async fn register(&self, event_id: i64, user_id: i64) -> Result<Registration> {
        self.register_at(event_id, user_id, Utc::now()).await
    }

    /// Register as of `now`; the deadline check compares against this instant
    pub async fn register_at(&self, event_id: i64, user_id: i64, now: DateTime<Utc>) -> Result<Registration> {
        Ok(self.reserve_at(event_id, user_id, now).await?.registration)
    }

    /// Register and return the event as it stood right after the slot was taken
    pub async fn reserve(&self, event_id: i64, user_id: i64) -> Result<SlotChange> {
        self.reserve_at(event_id, user_id, Utc::now()).await
    }

    async fn reserve_at(&self, event_id: i64, user_id: i64, now: DateTime<Utc>) -> Result<SlotChange> {
        debug!(event_id = event_id, user_id = user_id, "Attempting registration");

        if self.store.find_user(user_id).await?.is_none() {
            return Err(EventDeskError::UserNotFound { user_id });
        }

        let change = match self
            .store
            .reserve_slot(event_id, user_id, self.config.initial_status(), now)
            .await
        {
            Ok(change) => change,
            Err(e) => {
                info!(event_id = event_id, user_id = user_id, reason = %e, "Registration rejected");
                return Err(e);
            }
        };

        log_registration_action(change.registration.id, event_id, user_id, "register");
        log_capacity_change(event_id, change.event.available_slots, change.event.total_slots, "register");
        Ok(change)
    }

    /// Cancel a registration, returning its slot to the event
    pub async fn cancel(&self, registration_id: i64) -> Result<()> {
        self.transition(registration_id, RegistrationStatus::Cancelled, "cancel").await?;
        Ok(())
    }

    pub async fn approve_registration(&self, registration_id: i64) -> Result<Registration> {
        self.transition(registration_id, RegistrationStatus::Approved, "approve").await
    }

    /// Reject a pending registration; the slot it held is released
    pub async fn reject_registration(&self, registration_id: i64) -> Result<Registration> {
        self.transition(registration_id, RegistrationStatus::Rejected, "reject").await
    }

    /// Mark the attendee as present
    pub async fn check_in(&self, registration_id: i64) -> Result<Registration> {
        self.transition(registration_id, RegistrationStatus::Attended, "check_in").await
    }

    pub async fn mark_no_show(&self, registration_id: i64) -> Result<Registration> {
        self.transition(registration_id, RegistrationStatus::NoShow, "no_show").await
    }

    async fn transition(
        &self,
        registration_id: i64,
        target: RegistrationStatus,
        action: &str,
    ) -> Result<Registration> {
        let SlotChange { event, registration, clamped } = self
            .store
            .transition_registration(registration_id, target, Utc::now())
            .await?;

        if clamped {
            warn!(
                event_id = event.id,
                registration_id = registration_id,
                total_slots = event.total_slots,
                "Slot release clamped: available slots already at total"
            );
        }

        log_registration_action(registration.id, registration.event_id, registration.user_id, action);
        log_capacity_change(event.id, event.available_slots, event.total_slots, action);
        Ok(registration)
    }

    /// Pending -> Approved; the event starts accepting registrations
    pub async fn approve_event(&self, event_id: i64) -> Result<Event> {
        let event = self.store.transition_event(event_id, EventStatus::Approved).await?;
        log_event_action(event_id, "approve", None, None);
        Ok(event)
    }

    /// Pending -> Rejected; the event will never accept registrations
    pub async fn reject_event(&self, event_id: i64) -> Result<Event> {
        let event = self.store.transition_event(event_id, EventStatus::Rejected).await?;
        log_event_action(event_id, "reject", None, None);
        Ok(event)
    }

    /// Change total capacity, keeping every taken slot taken
    pub async fn resize(&self, event_id: i64, new_total: i32) -> Result<Event> {
        let event = self.store.resize_event(event_id, new_total).await?;
        log_capacity_change(event_id, event.available_slots, event.total_slots, "resize");
        Ok(event)
    }

    /// Registrations currently holding a slot
    pub async fn registered_users(&self, event_id: i64) -> Result<Vec<Registration>> {
        if self.store.find_event(event_id).await?.is_none() {
            return Err(EventDeskError::EventNotFound { event_id });
        }
        let registrations = self.store.list_event_registrations(event_id).await?;
        Ok(registrations.into_iter().filter(Registration::is_active).collect())
    }

    /// Capacity snapshot; the active count comes from the registrations list
    pub async fn summary(&self, event_id: i64) -> Result<CapacitySummary> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id })?;
        let active = self.registered_users(event_id).await?.len() as i64;

        if active != i64::from(event.taken_slots()) {
            warn!(
                event_id = event_id,
                active_registrations = active,
                taken_slots = event.taken_slots(),
                "Slot counter disagrees with registrations list"
            );
        }

        Ok(CapacitySummary {
            event_id,
            status: event.status,
            total_slots: event.total_slots,
            available_slots: event.available_slots,
            active_registrations: active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Duration;
    use crate::database::MemoryStore;
    use crate::models::{CreateUserRequest, NewEvent, UserRole};

    async fn setup(total: i32, status: EventStatus) -> (CapacityTracker<MemoryStore>, Arc<MemoryStore>, i64) {
        let store = Arc::new(MemoryStore::new());
        let event = store
            .insert_event(NewEvent {
                title: "Concert".to_string(),
                description: None,
                category: None,
                venue: Some("Main hall".to_string()),
                organizer_id: 1,
                event_date: Utc::now() + Duration::days(7),
                registration_deadline: Utc::now() + Duration::days(6),
                total_slots: total,
                status,
            })
            .await
            .unwrap();
        let tracker = CapacityTracker::new(Arc::clone(&store), RegistrationConfig::default());
        (tracker, store, event.id)
    }

    async fn attendee(store: &MemoryStore, name: &str) -> i64 {
        store
            .insert_user(CreateUserRequest {
                username: name.to_string(),
                full_name: name.to_string(),
                email: format!("{}@example.com", name),
                role: UserRole::Attendee,
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_register_unknown_user() {
        let (tracker, _store, event_id) = setup(2, EventStatus::Approved).await;
        assert_matches!(tracker.register(event_id, 99).await, Err(EventDeskError::UserNotFound { user_id: 99 }));
    }

    #[tokio::test]
    async fn test_register_unknown_event() {
        let (tracker, store, _) = setup(2, EventStatus::Approved).await;
        let user = attendee(&store, "ann").await;
        assert_matches!(tracker.register(404, user).await, Err(EventDeskError::EventNotFound { event_id: 404 }));
    }

    #[tokio::test]
    async fn test_auto_confirm_policy() {
        let (_, store, event_id) = setup(2, EventStatus::Approved).await;
        let tracker = CapacityTracker::new(Arc::clone(&store), RegistrationConfig { auto_confirm: true });
        let user = attendee(&store, "ann").await;
        let registration = tracker.register(event_id, user).await.unwrap();
        assert_eq!(registration.status, RegistrationStatus::Registered);
    }

    #[tokio::test]
    async fn test_reserve_reports_event_after_its_own_reservation() {
        let (tracker, store, event_id) = setup(3, EventStatus::Approved).await;
        let first = attendee(&store, "ann").await;
        let second = attendee(&store, "bob").await;

        let change = tracker.reserve(event_id, first).await.unwrap();
        assert_eq!(change.event.available_slots, 2);
        assert_eq!(change.registration.user_id, first);

        tracker.register(event_id, second).await.unwrap();
        // The earlier snapshot is unaffected by later registrations
        assert_eq!(change.event.available_slots, 2);
        assert_eq!(tracker.summary(event_id).await.unwrap().available_slots, 1);
    }

    #[tokio::test]
    async fn test_reject_registration_releases_slot() {
        let (tracker, store, event_id) = setup(1, EventStatus::Approved).await;
        let user = attendee(&store, "ann").await;
        let registration = tracker.register(event_id, user).await.unwrap();

        tracker.reject_registration(registration.id).await.unwrap();
        let summary = tracker.summary(event_id).await.unwrap();
        assert_eq!(summary.available_slots, 1);
        assert_eq!(summary.active_registrations, 0);
    }

    #[tokio::test]
    async fn test_check_in_after_approval() {
        let (tracker, store, event_id) = setup(3, EventStatus::Approved).await;
        let user = attendee(&store, "ann").await;
        let registration = tracker.register(event_id, user).await.unwrap();

        assert_matches!(
            tracker.check_in(registration.id).await,
            Err(EventDeskError::InvalidStateTransition { .. })
        );
        tracker.approve_registration(registration.id).await.unwrap();
        let attended = tracker.check_in(registration.id).await.unwrap();
        assert!(attended.checked_in);
        assert_eq!(tracker.summary(event_id).await.unwrap().available_slots, 2);
    }

    #[tokio::test]
    async fn test_approve_and_reject_event() {
        let (tracker, _store, event_id) = setup(3, EventStatus::Pending).await;
        let event = tracker.approve_event(event_id).await.unwrap();
        assert_eq!(event.status, EventStatus::Approved);
        assert_matches!(
            tracker.reject_event(event_id).await,
            Err(EventDeskError::InvalidStateTransition { .. })
        );
    }

    #[tokio::test]
    async fn test_resize_through_tracker() {
        let (tracker, store, event_id) = setup(2, EventStatus::Approved).await;
        let user = attendee(&store, "ann").await;
        tracker.register(event_id, user).await.unwrap();

        let event = tracker.resize(event_id, 5).await.unwrap();
        assert_eq!((event.total_slots, event.available_slots), (5, 4));
        assert_matches!(tracker.resize(event_id, 0).await, Err(EventDeskError::InvalidInput(_)));
    }
}
