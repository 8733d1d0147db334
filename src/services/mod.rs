//! Services module
//!
//! This module contains business logic services

pub mod capacity;
pub mod event;
pub mod user;

// Re-export commonly used services
pub use capacity::CapacityTracker;
pub use event::EventService;
pub use user::UserService;

use std::sync::Arc;
use crate::config::settings::Settings;
use crate::database::store::EventStore;

/// Service factory for creating and managing all services over one store
pub struct ServiceFactory<S> {
    pub user_service: UserService<S>,
    pub event_service: EventService<S>,
    pub capacity: CapacityTracker<S>,
    store: Arc<S>,
}

impl<S> Clone for ServiceFactory<S> {
    fn clone(&self) -> Self {
        Self {
            user_service: self.user_service.clone(),
            event_service: self.event_service.clone(),
            capacity: self.capacity.clone(),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: EventStore> ServiceFactory<S> {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(store: Arc<S>, settings: &Settings) -> Self {
        let capacity = CapacityTracker::new(Arc::clone(&store), settings.registration.clone());
        let event_service = EventService::new(Arc::clone(&store), capacity.clone());
        let user_service = UserService::new(Arc::clone(&store));

        Self {
            user_service,
            event_service,
            capacity,
            store,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Health check for the storage backend
    pub async fn health_check(&self) -> ServiceHealthStatus {
        let store_healthy = match self.store.health_check().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Store health check failed");
                false
            }
        };

        ServiceHealthStatus { store_healthy }
    }
}

/// Health status for all services
#[derive(Debug, Clone)]
pub struct ServiceHealthStatus {
    pub store_healthy: bool,
}

impl ServiceHealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.store_healthy
    }

    /// Get list of unhealthy services
    pub fn get_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !self.store_healthy {
            issues.push("Storage backend unreachable".to_string());
        }

        issues
    }
}
