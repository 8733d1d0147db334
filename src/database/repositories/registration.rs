//! Registration repository implementation
//!
//! Every mutation that can move an event's slot counter runs in a single
//! transaction holding the event row lock, so concurrent registrations for
//! the last slot serialize on that row.

use sqlx::PgPool;
use chrono::{DateTime, Utc};
use crate::database::repositories::event::EventRepository;
use crate::database::store::SlotChange;
use crate::models::registration::{Registration, RegistrationStatus};
use crate::utils::errors::EventDeskError;

const REGISTRATION_COLUMNS: &str = "id, event_id, user_id, registered_at, status, checked_in, updated_at";

// Inlined into SQL; must match RegistrationStatus::SLOT_CONSUMING
const ACTIVE_STATUSES_SQL: &str = "('pending', 'approved', 'registered', 'attended', 'no_show')";

#[derive(Debug, Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Take a slot on the event and record the registration
    pub async fn reserve(
        &self,
        event_id: i64,
        user_id: i64,
        initial_status: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Result<SlotChange, EventDeskError> {
        let mut tx = self.pool.begin().await?;
        let mut event = EventRepository::lock_for_update(&mut tx, event_id).await?;

        event.ensure_open_for_registration(now)?;

        let (active,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND user_id = $2 AND status IN {ACTIVE_STATUSES_SQL}"
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if active > 0 {
            return Err(EventDeskError::AlreadyRegistered { event_id, user_id });
        }

        event.reserve_slot()?;
        let event = EventRepository::save_locked(&mut tx, &event).await?;

        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            INSERT INTO registrations (event_id, user_id, registered_at, status, checked_in, updated_at)
            VALUES ($1, $2, $3, $4, FALSE, $3)
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .bind(now)
        .bind(initial_status)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SlotChange { event, registration, clamped: false })
    }

    /// Move a registration to `target`, giving its slot back when it stops holding one
    pub async fn transition(
        &self,
        registration_id: i64,
        target: RegistrationStatus,
        now: DateTime<Utc>,
    ) -> Result<SlotChange, EventDeskError> {
        let event_id = self
            .find_by_id(registration_id)
            .await?
            .ok_or(EventDeskError::RegistrationNotFound { registration_id })?
            .event_id;

        let mut tx = self.pool.begin().await?;
        let mut event = EventRepository::lock_for_update(&mut tx, event_id).await?;

        // Re-read under the event lock; the first read only located the event
        let mut registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(registration_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(EventDeskError::RegistrationNotFound { registration_id })?;

        let releases_slot = registration.transition_to(target, now)?;
        let mut clamped = false;
        if releases_slot {
            clamped = !event.release_slot();
            event = EventRepository::save_locked(&mut tx, &event).await?;
        }

        let registration = sqlx::query_as::<_, Registration>(&format!(
            r#"
            UPDATE registrations
            SET status = $2,
                checked_in = $3,
                updated_at = $4
            WHERE id = $1
            RETURNING {REGISTRATION_COLUMNS}
            "#
        ))
        .bind(registration.id)
        .bind(registration.status)
        .bind(registration.checked_in)
        .bind(registration.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SlotChange { event, registration, clamped })
    }

    /// Find registration by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Registration>, EventDeskError> {
        let registration = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(registration)
    }

    /// Get registrations of an event
    pub async fn get_for_event(&self, event_id: i64) -> Result<Vec<Registration>, EventDeskError> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE event_id = $1 ORDER BY registered_at ASC, id ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }

    /// Get registrations of a user
    pub async fn get_for_user(&self, user_id: i64) -> Result<Vec<Registration>, EventDeskError> {
        let registrations = sqlx::query_as::<_, Registration>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE user_id = $1 ORDER BY registered_at ASC, id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(registrations)
    }
}
