//! Registration command handlers

use crate::database::store::EventStore;
use crate::services::ServiceFactory;
use crate::utils::errors::Result;
use crate::utils::helpers::format_timestamp;

/// Handle `register <event_id> <user_id>`
pub async fn handle_register<S: EventStore>(services: &ServiceFactory<S>, event_id: i64, user_id: i64) -> Result<String> {
    let change = services.capacity.reserve(event_id, user_id).await?;

    Ok(format!(
        "Registration #{} created ({}). {} slot(s) left.",
        change.registration.id, change.registration.status, change.event.available_slots
    ))
}

/// Handle `cancel <registration_id>`
pub async fn handle_cancel<S: EventStore>(services: &ServiceFactory<S>, registration_id: i64) -> Result<String> {
    services.capacity.cancel(registration_id).await?;
    Ok(format!("Registration #{} cancelled", registration_id))
}

/// Handle `checkin <registration_id>`
pub async fn handle_check_in<S: EventStore>(services: &ServiceFactory<S>, registration_id: i64) -> Result<String> {
    let registration = services.capacity.check_in(registration_id).await?;
    Ok(format!("Registration #{} checked in", registration.id))
}

/// Handle `confirm <registration_id>`
pub async fn handle_confirm<S: EventStore>(services: &ServiceFactory<S>, registration_id: i64) -> Result<String> {
    let registration = services.capacity.approve_registration(registration_id).await?;
    Ok(format!("Registration #{} approved", registration.id))
}

/// Handle `decline <registration_id>`; the slot goes back to the event
pub async fn handle_decline<S: EventStore>(services: &ServiceFactory<S>, registration_id: i64) -> Result<String> {
    let registration = services.capacity.reject_registration(registration_id).await?;
    Ok(format!("Registration #{} rejected", registration.id))
}

/// Handle `noshow <registration_id>`
pub async fn handle_no_show<S: EventStore>(services: &ServiceFactory<S>, registration_id: i64) -> Result<String> {
    let registration = services.capacity.mark_no_show(registration_id).await?;
    Ok(format!("Registration #{} marked as no-show", registration.id))
}

/// Handle `participants <event_id>`
pub async fn handle_participants<S: EventStore>(services: &ServiceFactory<S>, event_id: i64) -> Result<String> {
    let registrations = services.capacity.registered_users(event_id).await?;
    if registrations.is_empty() {
        return Ok(format!("No participants registered for event #{}", event_id));
    }

    let mut lines = Vec::with_capacity(registrations.len());
    for registration in registrations {
        let user = services.user_service.get_user(registration.user_id).await?;
        lines.push(format!(
            "#{:<4} {:<20} {:<10} {}{}",
            registration.id,
            user.username,
            registration.status,
            format_timestamp(registration.registered_at),
            if registration.checked_in { " (checked in)" } else { "" },
        ));
    }

    Ok(lines.join("\n"))
}

/// Handle `dashboard <user_id>`
pub async fn handle_dashboard<S: EventStore>(services: &ServiceFactory<S>, user_id: i64) -> Result<String> {
    let dashboard = services.event_service.dashboard(user_id).await?;
    Ok(serde_json::to_string_pretty(&dashboard)?)
}
