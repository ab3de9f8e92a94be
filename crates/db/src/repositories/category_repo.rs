//! Repository for the `event_categories` table.

use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::EventCategory;

const COLUMNS: &str = "category_id, category_name";

pub struct CategoryRepo;

impl CategoryRepo {
    /// List all categories, ordered by name ascending.
    pub async fn list(pool: &PgPool) -> Result<Vec<EventCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM event_categories ORDER BY category_name ASC");
        sqlx::query_as::<_, EventCategory>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<EventCategory>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM event_categories WHERE category_id = ANY($1)");
        sqlx::query_as::<_, EventCategory>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
