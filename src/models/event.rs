//! Event model
//!
//! The event status machine and the slot counter live here. `available_slots`
//! is only ever touched through [`Event::reserve_slot`], [`Event::release_slot`]
//! and [`Event::resize`], which the stores call while holding the event lock.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::{EventDeskError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Pending => "pending",
            EventStatus::Approved => "approved",
            EventStatus::Rejected => "rejected",
            EventStatus::Cancelled => "cancelled",
            EventStatus::Completed => "completed",
        }
    }

    /// Draft -> Pending -> {Approved, Rejected}; Approved -> {Cancelled, Completed}
    pub fn can_transition_to(&self, target: EventStatus) -> bool {
        matches!(
            (self, target),
            (EventStatus::Draft, EventStatus::Pending)
                | (EventStatus::Pending, EventStatus::Approved)
                | (EventStatus::Pending, EventStatus::Rejected)
                | (EventStatus::Approved, EventStatus::Cancelled)
                | (EventStatus::Approved, EventStatus::Completed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Rejected | EventStatus::Cancelled | EventStatus::Completed)
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventStatus {
    type Err = EventDeskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(EventStatus::Draft),
            "pending" => Ok(EventStatus::Pending),
            "approved" => Ok(EventStatus::Approved),
            "rejected" => Ok(EventStatus::Rejected),
            "cancelled" => Ok(EventStatus::Cancelled),
            "completed" => Ok(EventStatus::Completed),
            other => Err(EventDeskError::InvalidInput(format!("Unknown event status: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub venue: Option<String>,
    pub organizer_id: i64,
    pub event_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub total_slots: i32,
    pub available_slots: i32,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Move the event to `target`, enforcing the status machine
    pub fn transition_to(&mut self, target: EventStatus) -> Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(EventDeskError::InvalidStateTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }
        self.status = target;
        Ok(())
    }

    /// Status and deadline checks that precede any slot reservation
    pub fn ensure_open_for_registration(&self, now: DateTime<Utc>) -> Result<()> {
        if self.status != EventStatus::Approved {
            return Err(EventDeskError::EventNotApproved {
                event_id: self.id,
                status: self.status.to_string(),
            });
        }
        if now > self.registration_deadline {
            return Err(EventDeskError::DeadlineExpired {
                event_id: self.id,
                deadline: self.registration_deadline,
            });
        }
        Ok(())
    }

    /// Take one slot. Leaves the event untouched on failure.
    pub fn reserve_slot(&mut self) -> Result<()> {
        if self.available_slots <= 0 {
            return Err(EventDeskError::CapacityExceeded { event_id: self.id });
        }
        self.available_slots -= 1;
        Ok(())
    }

    /// Give one slot back. Returns false when the counter was already at
    /// `total_slots` and the increment was clamped away.
    pub fn release_slot(&mut self) -> bool {
        if self.available_slots >= self.total_slots {
            self.available_slots = self.total_slots;
            return false;
        }
        self.available_slots += 1;
        true
    }

    /// Change the total capacity, shifting the available count by the same delta
    pub fn resize(&mut self, new_total: i32) -> Result<()> {
        if self.status.is_terminal() {
            return Err(EventDeskError::InvalidInput(format!(
                "Cannot resize event {} in status {}",
                self.id, self.status
            )));
        }
        if new_total < 1 {
            return Err(EventDeskError::InvalidInput("Total slots must be at least 1".to_string()));
        }
        let taken = self.total_slots - self.available_slots;
        if new_total < taken {
            return Err(EventDeskError::InvalidInput(format!(
                "Cannot shrink event {} to {} slots: {} already taken",
                self.id, new_total, taken
            )));
        }
        self.total_slots = new_total;
        self.available_slots = new_total - taken;
        Ok(())
    }

    pub fn taken_slots(&self) -> i32 {
        self.total_slots - self.available_slots
    }

    pub fn is_full(&self) -> bool {
        self.available_slots == 0
    }

    /// Apply descriptive edits. Refused on terminal events or when the
    /// resulting deadline would fall after the event date; nothing changes
    /// on failure.
    pub fn apply_details(&mut self, request: UpdateEventRequest, now: DateTime<Utc>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(EventDeskError::InvalidInput(format!(
                "Event {} can no longer be edited (status: {})",
                self.id, self.status
            )));
        }

        let event_date = request.event_date.unwrap_or(self.event_date);
        let deadline = request.registration_deadline.unwrap_or(self.registration_deadline);
        if deadline > event_date {
            return Err(EventDeskError::InvalidInput(
                "Registration deadline cannot be after the event date".to_string(),
            ));
        }

        if let Some(title) = request.title {
            self.title = title;
        }
        if request.description.is_some() {
            self.description = request.description;
        }
        if request.category.is_some() {
            self.category = request.category;
        }
        if request.venue.is_some() {
            self.venue = request.venue;
        }
        self.event_date = event_date;
        self.registration_deadline = deadline;
        self.updated_at = now;
        Ok(())
    }
}

/// Input accepted by the event service when creating an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub venue: Option<String>,
    pub event_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub total_slots: i32,
    #[serde(default)]
    pub submit_for_approval: bool,
}

/// Fully resolved event row handed to a store for insertion
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub venue: Option<String>,
    pub organizer_id: i64,
    pub event_date: DateTime<Utc>,
    pub registration_deadline: DateTime<Utc>,
    pub total_slots: i32,
    pub status: EventStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub venue: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub registration_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub organizer_id: Option<i64>,
    pub upcoming_only: bool,
}

impl EventFilter {
    pub fn matches(&self, event: &Event, now: DateTime<Utc>) -> bool {
        if let Some(status) = self.status {
            if event.status != status {
                return false;
            }
        }
        if let Some(organizer_id) = self.organizer_id {
            if event.organizer_id != organizer_id {
                return false;
            }
        }
        !(self.upcoming_only && event.event_date <= now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "attachment_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    Document,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventAttachment {
    pub id: i64,
    pub event_id: i64,
    pub kind: AttachmentKind,
    pub file_name: String,
    pub content_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub event_id: i64,
    pub kind: AttachmentKind,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Capacity snapshot built from the authoritative registrations list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacitySummary {
    pub event_id: i64,
    pub status: EventStatus,
    pub total_slots: i32,
    pub available_slots: i32,
    pub active_registrations: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_event(total: i32, available: i32, status: EventStatus) -> Event {
        let now = Utc::now();
        Event {
            id: 7,
            title: "Spring meetup".to_string(),
            description: None,
            category: None,
            venue: None,
            organizer_id: 1,
            event_date: now + Duration::days(10),
            registration_deadline: now + Duration::days(5),
            total_slots: total,
            available_slots: available,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_event_status_machine() {
        assert!(EventStatus::Draft.can_transition_to(EventStatus::Pending));
        assert!(EventStatus::Pending.can_transition_to(EventStatus::Approved));
        assert!(EventStatus::Pending.can_transition_to(EventStatus::Rejected));
        assert!(EventStatus::Approved.can_transition_to(EventStatus::Completed));
        assert!(!EventStatus::Draft.can_transition_to(EventStatus::Approved));
        assert!(!EventStatus::Rejected.can_transition_to(EventStatus::Approved));
        assert!(!EventStatus::Cancelled.can_transition_to(EventStatus::Approved));
        assert!(!EventStatus::Completed.can_transition_to(EventStatus::Cancelled));
    }

    #[test]
    fn test_transition_error_names_both_states() {
        let mut event = sample_event(2, 2, EventStatus::Draft);
        let err = event.transition_to(EventStatus::Approved).unwrap_err();
        assert_eq!(err.to_string(), "Invalid state transition: draft -> approved");
        assert_eq!(event.status, EventStatus::Draft);
    }

    #[test]
    fn test_reserve_and_release_slot() {
        let mut event = sample_event(1, 1, EventStatus::Approved);
        event.reserve_slot().unwrap();
        assert!(event.is_full());
        assert!(matches!(event.reserve_slot(), Err(EventDeskError::CapacityExceeded { event_id: 7 })));
        assert_eq!(event.available_slots, 0);

        assert!(event.release_slot());
        assert_eq!(event.available_slots, 1);
        assert!(!event.release_slot());
        assert_eq!(event.available_slots, 1);
    }

    #[test]
    fn test_registration_window_checks() {
        let event = sample_event(3, 3, EventStatus::Pending);
        assert!(matches!(
            event.ensure_open_for_registration(Utc::now()),
            Err(EventDeskError::EventNotApproved { .. })
        ));

        let event = sample_event(3, 3, EventStatus::Approved);
        assert!(event.ensure_open_for_registration(Utc::now()).is_ok());
        assert!(matches!(
            event.ensure_open_for_registration(Utc::now() + Duration::days(6)),
            Err(EventDeskError::DeadlineExpired { .. })
        ));
    }

    #[test]
    fn test_resize_keeps_taken_slots() {
        let mut event = sample_event(5, 2, EventStatus::Approved);
        event.resize(8).unwrap();
        assert_eq!((event.total_slots, event.available_slots), (8, 5));

        event.resize(3).unwrap();
        assert_eq!((event.total_slots, event.available_slots), (3, 0));

        assert!(event.resize(2).is_err());
        assert!(event.resize(0).is_err());
        assert_eq!((event.total_slots, event.available_slots), (3, 0));
    }

    #[test]
    fn test_apply_details() {
        let mut event = sample_event(3, 3, EventStatus::Approved);
        let new_date = event.event_date + Duration::days(2);
        event
            .apply_details(
                UpdateEventRequest { venue: Some("Hall C".to_string()), event_date: Some(new_date), ..Default::default() },
                Utc::now(),
            )
            .unwrap();
        assert_eq!(event.venue.as_deref(), Some("Hall C"));
        assert_eq!(event.event_date, new_date);
        assert_eq!(event.title, "Spring meetup");

        let late_deadline = UpdateEventRequest {
            registration_deadline: Some(new_date + Duration::hours(1)),
            ..Default::default()
        };
        assert!(matches!(event.apply_details(late_deadline, Utc::now()), Err(EventDeskError::InvalidInput(_))));
        assert!(event.registration_deadline < event.event_date);

        let mut cancelled = sample_event(3, 3, EventStatus::Cancelled);
        let rename = UpdateEventRequest { title: Some("Renamed".to_string()), ..Default::default() };
        assert!(matches!(cancelled.apply_details(rename, Utc::now()), Err(EventDeskError::InvalidInput(_))));
        assert_eq!(cancelled.title, "Spring meetup");
    }

    #[test]
    fn test_filter_matches() {
        let event = sample_event(5, 5, EventStatus::Approved);
        let filter = EventFilter { status: Some(EventStatus::Approved), organizer_id: Some(1), upcoming_only: true };
        assert!(filter.matches(&event, Utc::now()));
        assert!(!filter.matches(&event, Utc::now() + Duration::days(11)));

        let filter = EventFilter { organizer_id: Some(2), ..Default::default() };
        assert!(!filter.matches(&event, Utc::now()));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("Approved".parse::<EventStatus>().unwrap(), EventStatus::Approved);
        assert!("archived".parse::<EventStatus>().is_err());
    }
}
