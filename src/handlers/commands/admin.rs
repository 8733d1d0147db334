//! Admin command handlers

use crate::database::store::EventStore;
use crate::models::{CreateUserRequest, UserRole};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Handle `approve <admin_id> <event_id>`
pub async fn handle_approve<S: EventStore>(services: &ServiceFactory<S>, admin_id: i64, event_id: i64) -> Result<String> {
    let event = services.event_service.approve(admin_id, event_id).await?;
    Ok(format!("Event #{} \"{}\" approved", event.id, event.title))
}

/// Handle `reject <admin_id> <event_id>`
pub async fn handle_reject<S: EventStore>(services: &ServiceFactory<S>, admin_id: i64, event_id: i64) -> Result<String> {
    let event = services.event_service.reject(admin_id, event_id).await?;
    Ok(format!("Event #{} \"{}\" rejected", event.id, event.title))
}

/// Handle `users`
pub async fn handle_users<S: EventStore>(services: &ServiceFactory<S>) -> Result<String> {
    let users = services.user_service.list_users().await?;
    if users.is_empty() {
        return Ok("No users found".to_string());
    }

    Ok(users
        .iter()
        .map(|u| format!("#{:<4} {:<20} {:<10} {}", u.id, u.username, u.role, u.full_name))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Handle `adduser <username> <role> <email> <full name>`
pub async fn handle_add_user<S: EventStore>(
    services: &ServiceFactory<S>,
    username: String,
    role: UserRole,
    email: String,
    full_name: String,
) -> Result<String> {
    let user = services
        .user_service
        .create_user(CreateUserRequest { username, full_name, email, role })
        .await?;
    Ok(format!("User #{} {} created ({})", user.id, user.username, user.role))
}
