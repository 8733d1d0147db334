//! Registration model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::utils::errors::{EventDeskError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Registered,
    Waitlisted,
    Attended,
    NoShow,
}

impl RegistrationStatus {
    /// Statuses that hold one of the event's slots
    pub const SLOT_CONSUMING: [RegistrationStatus; 5] = [
        RegistrationStatus::Pending,
        RegistrationStatus::Approved,
        RegistrationStatus::Registered,
        RegistrationStatus::Attended,
        RegistrationStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Pending => "pending",
            RegistrationStatus::Approved => "approved",
            RegistrationStatus::Rejected => "rejected",
            RegistrationStatus::Cancelled => "cancelled",
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Waitlisted => "waitlisted",
            RegistrationStatus::Attended => "attended",
            RegistrationStatus::NoShow => "no_show",
        }
    }

    pub fn consumes_slot(&self) -> bool {
        Self::SLOT_CONSUMING.contains(self)
    }

    pub fn can_transition_to(&self, target: RegistrationStatus) -> bool {
        use RegistrationStatus::*;
        matches!(
            (self, target),
            (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Approved, Cancelled)
                | (Approved, Attended)
                | (Approved, NoShow)
                | (Registered, Cancelled)
                | (Registered, Attended)
                | (Registered, NoShow)
                | (Waitlisted, Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::Rejected
                | RegistrationStatus::Cancelled
                | RegistrationStatus::Attended
                | RegistrationStatus::NoShow
        )
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub event_id: i64,
    pub user_id: i64,
    pub registered_at: DateTime<Utc>,
    pub status: RegistrationStatus,
    pub checked_in: bool,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// Apply a status transition.
    ///
    /// Returns `true` when the registration gave up a slot, in which case the
    /// caller must release one slot on the owning event under the same lock.
    pub fn transition_to(&mut self, target: RegistrationStatus, now: DateTime<Utc>) -> Result<bool> {
        if target == RegistrationStatus::Cancelled && self.status == RegistrationStatus::Cancelled {
            return Err(EventDeskError::AlreadyCancelled { registration_id: self.id });
        }
        if !self.status.can_transition_to(target) {
            return Err(EventDeskError::InvalidStateTransition {
                from: self.status.to_string(),
                to: target.to_string(),
            });
        }

        let releases_slot = self.status.consumes_slot() && !target.consumes_slot();
        self.status = target;
        if target == RegistrationStatus::Attended {
            self.checked_in = true;
        }
        self.updated_at = now;
        Ok(releases_slot)
    }

    pub fn is_active(&self) -> bool {
        self.status.consumes_slot()
    }
}
