//! Event repository implementation
//!
//! Status transitions and capacity changes lock the event row with
//! `SELECT ... FOR UPDATE` and apply the model's rules inside the transaction.

use sqlx::{PgPool, Postgres, Transaction};
use chrono::Utc;
use crate::models::event::{Event, EventStatus, NewEvent, UpdateEventRequest, EventFilter, EventAttachment, NewAttachment};
use crate::utils::errors::EventDeskError;

pub(crate) const EVENT_COLUMNS: &str = "id, title, description, category, venue, organizer_id, event_date, \
     registration_deadline, total_slots, available_slots, status, created_at, updated_at";

const ATTACHMENT_COLUMNS: &str = "id, event_id, kind, file_name, content_type, data, created_at";

#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new event with every slot available
    pub async fn create(&self, event: NewEvent) -> Result<Event, EventDeskError> {
        let now = Utc::now();
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            INSERT INTO events (title, description, category, venue, organizer_id, event_date,
                                registration_deadline, total_slots, available_slots, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8, $9, $10, $10)
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.title)
        .bind(event.description)
        .bind(event.category)
        .bind(event.venue)
        .bind(event.organizer_id)
        .bind(event.event_date)
        .bind(event.registration_deadline)
        .bind(event.total_slots)
        .bind(event.status)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, EventDeskError> {
        let event = sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Lock the event row for the rest of the transaction
    pub(crate) async fn lock_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> Result<Event, EventDeskError> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"))
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(EventDeskError::EventNotFound { event_id: id })
    }

    /// Persist status and slot counters of a locked event
    pub(crate) async fn save_locked(
        tx: &mut Transaction<'_, Postgres>,
        event: &Event,
    ) -> Result<Event, EventDeskError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET status = $2,
                total_slots = $3,
                available_slots = $4,
                updated_at = $5
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(event.status)
        .bind(event.total_slots)
        .bind(event.available_slots)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

        Ok(event)
    }

    /// Update descriptive fields under a row lock
    pub async fn update(&self, id: i64, request: UpdateEventRequest) -> Result<Event, EventDeskError> {
        let mut tx = self.pool.begin().await?;
        let mut event = Self::lock_for_update(&mut tx, id).await?;
        event.apply_details(request, Utc::now())?;

        let event = sqlx::query_as::<_, Event>(&format!(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                category = $4,
                venue = $5,
                event_date = $6,
                registration_deadline = $7,
                updated_at = $8
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.category)
        .bind(&event.venue)
        .bind(event.event_date)
        .bind(event.registration_deadline)
        .bind(event.updated_at)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(event)
    }

    /// Apply a status transition under a row lock
    pub async fn transition(&self, id: i64, target: EventStatus) -> Result<Event, EventDeskError> {
        let mut tx = self.pool.begin().await?;
        let mut event = Self::lock_for_update(&mut tx, id).await?;
        event.transition_to(target)?;
        let event = Self::save_locked(&mut tx, &event).await?;
        tx.commit().await?;

        Ok(event)
    }

    /// Change total capacity under a row lock
    pub async fn resize(&self, id: i64, new_total: i32) -> Result<Event, EventDeskError> {
        let mut tx = self.pool.begin().await?;
        let mut event = Self::lock_for_update(&mut tx, id).await?;
        event.resize(new_total)?;
        let event = Self::save_locked(&mut tx, &event).await?;
        tx.commit().await?;

        Ok(event)
    }

    /// List events matching a filter
    pub async fn list(&self, filter: &EventFilter) -> Result<Vec<Event>, EventDeskError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE ($1::event_status IS NULL OR status = $1)
              AND ($2::BIGINT IS NULL OR organizer_id = $2)
              AND (NOT $3 OR event_date > NOW())
            ORDER BY event_date ASC, id ASC
            "#
        ))
        .bind(filter.status)
        .bind(filter.organizer_id)
        .bind(filter.upcoming_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Store an attachment for an event
    pub async fn add_attachment(&self, attachment: NewAttachment) -> Result<EventAttachment, EventDeskError> {
        if self.find_by_id(attachment.event_id).await?.is_none() {
            return Err(EventDeskError::EventNotFound { event_id: attachment.event_id });
        }

        let stored = sqlx::query_as::<_, EventAttachment>(&format!(
            r#"
            INSERT INTO event_attachments (event_id, kind, file_name, content_type, data, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ATTACHMENT_COLUMNS}
            "#
        ))
        .bind(attachment.event_id)
        .bind(attachment.kind)
        .bind(attachment.file_name)
        .bind(attachment.content_type)
        .bind(attachment.data)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Get attachments of an event
    pub async fn get_attachments(&self, event_id: i64) -> Result<Vec<EventAttachment>, EventDeskError> {
        let attachments = sqlx::query_as::<_, EventAttachment>(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM event_attachments WHERE event_id = $1 ORDER BY id ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attachments)
    }
}
