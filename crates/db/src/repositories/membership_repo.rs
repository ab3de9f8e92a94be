//! Repository for the `rso_members` join table.

use campus_core::types::{DbId, UserId};
use sqlx::PgPool;

use crate::models::membership::RsoMember;

const COLUMNS: &str = "user_id, rso_id, joined_at";

pub struct MembershipRepo;

impl MembershipRepo {
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: UserId,
    ) -> Result<Vec<RsoMember>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rso_members WHERE user_id = $1 ORDER BY rso_id");
        sqlx::query_as::<_, RsoMember>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Add a membership. Returns `false` if it already existed.
    pub async fn insert(pool: &PgPool, user_id: UserId, rso_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO rso_members (user_id, rso_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, rso_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(rso_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a membership.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: UserId, rso_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM rso_members WHERE user_id = $1 AND rso_id = $2")
            .bind(user_id)
            .bind(rso_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
