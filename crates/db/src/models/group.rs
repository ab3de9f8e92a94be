//! Registered student organization (RSO) model.

use campus_core::rows::GroupRow;
use campus_core::types::{DbId, UserId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `rsos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Rso {
    pub rso_id: DbId,
    pub name: String,
    pub university_id: DbId,
    pub admin_id: Option<UserId>,
    pub is_active: bool,
}

impl From<Rso> for GroupRow {
    fn from(r: Rso) -> Self {
        Self {
            id: r.rso_id,
            name: r.name,
            organization_id: r.university_id,
            admin_id: r.admin_id,
            is_active: r.is_active,
        }
    }
}
