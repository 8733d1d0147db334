//! Event command handlers

use chrono::{DateTime, Utc};
use crate::database::store::EventStore;
use crate::models::{CreateEventRequest, Event, EventFilter};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::{format_bytes, format_timestamp, truncate_text};

/// One-line listing entry for an event
pub fn format_event_line(event: &Event) -> String {
    format!(
        "#{:<4} {:<32} {:<10} {} [{}/{} free]{}",
        event.id,
        truncate_text(&event.title, 32),
        event.status,
        format_timestamp(event.event_date),
        event.available_slots,
        event.total_slots,
        if event.is_full() { " FULL" } else { "" },
    )
}

/// Handle `events` - list all events ordered by date
pub async fn handle_events_list<S: EventStore>(services: &ServiceFactory<S>) -> Result<String> {
    let events = services.event_service.list_events(&EventFilter::default()).await?;
    if events.is_empty() {
        return Ok("No events found".to_string());
    }

    Ok(events.iter().map(format_event_line).collect::<Vec<_>>().join("\n"))
}

/// Handle `event <id>` - details plus a capacity summary
pub async fn handle_event_details<S: EventStore>(services: &ServiceFactory<S>, event_id: i64) -> Result<String> {
    let event = services.event_service.get_event(event_id).await?;
    let summary = services.capacity.summary(event_id).await?;
    let attachments = services.event_service.attachments(event_id).await?;

    let mut text = format!(
        "{}\nStatus: {}\nWhen: {}\nRegistration closes: {}\nVenue: {}\nCategory: {}\nSlots: {} of {} available ({} registered)",
        event.title,
        event.status,
        format_timestamp(event.event_date),
        format_timestamp(event.registration_deadline),
        event.venue.as_deref().unwrap_or("-"),
        event.category.as_deref().unwrap_or("-"),
        summary.available_slots,
        summary.total_slots,
        summary.active_registrations,
    );
    if let Some(description) = event.description.as_deref() {
        text.push_str(&format!("\n\n{}", description));
    }
    if !attachments.is_empty() {
        let total_bytes: u64 = attachments.iter().map(|a| a.data.len() as u64).sum();
        text.push_str(&format!("\nAttachments: {} ({})", attachments.len(), format_bytes(total_bytes)));
    }

    Ok(text)
}

/// Handle `create <actor_id> <slots> <event_date> <deadline> <title>`.
/// Organizers submit straight for approval; admins publish directly.
pub async fn handle_create_event<S: EventStore>(
    services: &ServiceFactory<S>,
    actor_id: i64,
    total_slots: i32,
    event_date: DateTime<Utc>,
    registration_deadline: DateTime<Utc>,
    title: String,
) -> Result<String> {
    let request = CreateEventRequest {
        title,
        description: None,
        category: None,
        venue: None,
        event_date,
        registration_deadline,
        total_slots,
        submit_for_approval: true,
    };
    let event = services.event_service.create_event(actor_id, request).await?;
    Ok(format!("Event #{} created ({})", event.id, event.status))
}

/// Handle `submit <actor_id> <event_id>`
pub async fn handle_submit<S: EventStore>(services: &ServiceFactory<S>, actor_id: i64, event_id: i64) -> Result<String> {
    let event = services.event_service.submit(actor_id, event_id).await?;
    Ok(format!("Event #{} submitted for approval", event.id))
}
