//! University (organization) model.

use campus_core::rows::OrganizationRow;
use campus_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `universities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct University {
    pub university_id: DbId,
    pub name: String,
    pub address: Option<String>,
}

impl From<University> for OrganizationRow {
    fn from(u: University) -> Self {
        Self {
            id: u.university_id,
            name: u.name,
        }
    }
}
