//! Location model.

use campus_core::rows::LocationRow;
use campus_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `locations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Location {
    pub location_id: DbId,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<Location> for LocationRow {
    fn from(l: Location) -> Self {
        Self {
            id: l.location_id,
            name: l.name,
        }
    }
}
