//! Campus event model.

use campus_core::rows::{EventRow, VisibilityTier};
use campus_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub event_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub event_datetime: Timestamp,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub created_by: UserId,
    pub rso_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub location_id: Option<DbId>,
    pub visibility: String,
    pub is_approved: bool,
}

impl From<Event> for EventRow {
    fn from(e: Event) -> Self {
        Self {
            id: e.event_id,
            title: e.name,
            description: e.description.unwrap_or_default(),
            date: e.event_datetime,
            visibility: VisibilityTier::from_str_value(&e.visibility),
            created_by: e.created_by,
            group_id: e.rso_id,
            category_id: e.category_id,
            location_id: e.location_id,
            contact_phone: e.contact_phone,
            contact_email: e.contact_email,
            is_approved: e.is_approved,
        }
    }
}
