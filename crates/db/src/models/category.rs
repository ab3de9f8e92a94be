//! Event category model.

use campus_core::rows::CategoryRow;
use campus_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `event_categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventCategory {
    pub category_id: DbId,
    pub category_name: String,
}

impl From<EventCategory> for CategoryRow {
    fn from(c: EventCategory) -> Self {
        Self {
            id: c.category_id,
            name: c.category_name,
        }
    }
}
