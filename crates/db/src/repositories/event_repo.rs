//! Repository for the `events` table.

use campus_core::rows::{EventQuery, NewEvent};
use sqlx::PgPool;

use crate::models::event::Event;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "event_id, name, description, event_datetime, contact_phone, \
    contact_email, created_by, rso_id, category_id, location_id, visibility, is_approved";

pub struct EventRepo;

impl EventRepo {
    /// List events matching `query`, ordered by date then id.
    ///
    /// The unapproved filter is pushed into SQL; visibility is decided by
    /// the caller.
    pub async fn list(pool: &PgPool, query: &EventQuery) -> Result<Vec<Event>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE ($1 = false OR is_approved) \
             ORDER BY event_datetime ASC, event_id ASC"
        );
        sqlx::query_as::<_, Event>(&sql)
            .bind(query.approved_only)
            .fetch_all(pool)
            .await
    }

    /// Insert an event, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (name, description, event_datetime, contact_phone, \
             contact_email, created_by, rso_id, category_id, location_id, visibility, \
             is_approved) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.date)
            .bind(&input.contact_phone)
            .bind(&input.contact_email)
            .bind(input.created_by)
            .bind(input.group_id)
            .bind(input.category_id)
            .bind(input.location_id)
            .bind(input.visibility.as_str())
            .bind(input.is_approved)
            .fetch_one(pool)
            .await
    }
}
