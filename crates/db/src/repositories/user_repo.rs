//! Repository for the `users` table.

use campus_core::types::UserId;
use sqlx::PgPool;

use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "user_id, name, email, university_id, role, created_at";

/// Read access to user profiles. Accounts are owned by the auth provider.
pub struct UserRepo;

impl UserRepo {
    /// Users whose id is in `ids`.
    pub async fn find_by_ids(pool: &PgPool, ids: &[UserId]) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE user_id = ANY($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
