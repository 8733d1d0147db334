//! User service implementation
//!
//! This service handles the user directory: creation with validation and lookups.

use std::sync::Arc;
use tracing::{debug, info, warn};
use crate::database::store::EventStore;
use crate::models::user::{User, CreateUserRequest};
use crate::utils::errors::{EventDeskError, Result};
use crate::utils::helpers::{is_valid_email, is_valid_username, normalize_whitespace};

/// User service for managing user operations
pub struct UserService<S> {
    store: Arc<S>,
}

impl<S> Clone for UserService<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store) }
    }
}

impl<S: EventStore> UserService<S> {
    /// Create a new UserService instance
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a user after validating username and email
    pub async fn create_user(&self, mut request: CreateUserRequest) -> Result<User> {
        debug!(username = %request.username, role = %request.role, "Creating user");

        request.username = request.username.trim().to_string();
        request.email = request.email.trim().to_lowercase();
        request.full_name = normalize_whitespace(&request.full_name);

        if !is_valid_username(&request.username) {
            warn!(username = %request.username, "Rejected invalid username");
            return Err(EventDeskError::InvalidInput(format!("Invalid username: {}", request.username)));
        }
        if !is_valid_email(&request.email) {
            return Err(EventDeskError::InvalidInput(format!("Invalid email: {}", request.email)));
        }
        if request.full_name.is_empty() {
            return Err(EventDeskError::InvalidInput("Full name is required".to_string()));
        }
        if self.store.find_user_by_username(&request.username).await?.is_some() {
            return Err(EventDeskError::InvalidInput(format!("Username already taken: {}", request.username)));
        }

        let user = self.store.insert_user(request).await?;
        info!(user_id = user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or(EventDeskError::UserNotFound { user_id })
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.store.list_users().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::models::UserRole;

    fn request(username: &str, email: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            full_name: "  Test   User ".to_string(),
            email: email.to_string(),
            role: UserRole::Organizer,
        }
    }

    #[tokio::test]
    async fn test_create_user_normalizes_fields() {
        let service = UserService::new(Arc::new(MemoryStore::new()));
        let user = service.create_user(request(" organizer1 ", "Org@Example.COM")).await.unwrap();
        assert_eq!(user.username, "organizer1");
        assert_eq!(user.email, "org@example.com");
        assert_eq!(user.full_name, "Test User");
        assert_eq!(service.get_user(user.id).await.unwrap().username, "organizer1");
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let service = UserService::new(Arc::new(MemoryStore::new()));
        assert!(service.create_user(request("x", "x@example.com")).await.is_err());
        assert!(service.create_user(request("valid_name", "not-an-email")).await.is_err());

        service.create_user(request("valid_name", "a@example.com")).await.unwrap();
        let err = service.create_user(request("valid_name", "b@example.com")).await.unwrap_err();
        assert!(err.to_string().contains("already taken"));
    }

    #[tokio::test]
    async fn test_get_missing_user() {
        let service = UserService::new(Arc::new(MemoryStore::new()));
        assert!(matches!(service.get_user(3).await, Err(EventDeskError::UserNotFound { user_id: 3 })));
    }
}
