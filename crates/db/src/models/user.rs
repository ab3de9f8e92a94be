//! User model.

use campus_core::error::StoreError;
use campus_core::rows::{Role, UserRow};
use campus_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub university_id: Option<DbId>,
    pub role: String,
    pub created_at: Timestamp,
}

impl TryFrom<User> for UserRow {
    type Error = StoreError;

    fn try_from(u: User) -> Result<Self, Self::Error> {
        let role = Role::from_str_value(&u.role).map_err(|reason| StoreError::Decode {
            entity: "user",
            reason,
        })?;
        Ok(Self {
            id: u.user_id,
            name: u.name,
            email: u.email,
            organization_id: u.university_id,
            role,
        })
    }
}
