//! Repository for the `locations` table.

use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::location::Location;

const COLUMNS: &str = "location_id, name, address, latitude, longitude";

pub struct LocationRepo;

impl LocationRepo {
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Location>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locations WHERE location_id = ANY($1)");
        sqlx::query_as::<_, Location>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
