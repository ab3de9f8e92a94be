//! Repository for the `rsos` table.

use campus_core::rows::NewGroup;
use campus_core::types::DbId;
use sqlx::PgPool;

use crate::models::group::Rso;

const COLUMNS: &str = "rso_id, name, university_id, admin_id, is_active";

pub struct RsoRepo;

impl RsoRepo {
    /// RSOs whose id is in `ids`, active or not.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Rso>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rsos WHERE rso_id = ANY($1)");
        sqlx::query_as::<_, Rso>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Insert an RSO, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewGroup) -> Result<Rso, sqlx::Error> {
        let query = format!(
            "INSERT INTO rsos (name, university_id, admin_id, is_active) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rso>(&query)
            .bind(&input.name)
            .bind(input.organization_id)
            .bind(input.admin_id)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }
}
