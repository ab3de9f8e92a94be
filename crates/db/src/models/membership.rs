//! RSO membership model.

use campus_core::rows::MembershipRow;
use campus_core::types::{DbId, Timestamp, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `rso_members` join table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RsoMember {
    pub user_id: UserId,
    pub rso_id: DbId,
    pub joined_at: Timestamp,
}

impl From<RsoMember> for MembershipRow {
    fn from(m: RsoMember) -> Self {
        Self {
            user_id: m.user_id,
            group_id: m.rso_id,
        }
    }
}
