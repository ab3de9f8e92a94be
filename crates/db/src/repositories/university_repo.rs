//! Repository for the `universities` table.

use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::university::University;

const COLUMNS: &str = "university_id, name, address";

pub struct UniversityRepo;

impl UniversityRepo {
    /// Universities whose id is in `ids`.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<University>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM universities WHERE university_id = ANY($1)");
        sqlx::query_as::<_, University>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
