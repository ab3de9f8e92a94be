//! Mapping of `sqlx` failures onto the collaborator error of the core.

use campus_core::error::StoreError;

/// PostgreSQL error code for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL error code for a foreign key violation.
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// PostgreSQL error code for a check constraint violation.
const CHECK_VIOLATION: &str = "23514";

/// Classify a sqlx error into a [`StoreError`].
///
/// - Constraint violations map to `Rejected` (the write was refused).
/// - Column decode failures map to `Decode`.
/// - Everything else maps to `Unavailable`.
pub fn classify(entity: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            match code.as_deref() {
                Some(UNIQUE_VIOLATION) | Some(FOREIGN_KEY_VIOLATION) | Some(CHECK_VIOLATION) => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    StoreError::Rejected(format!("{entity} violates constraint {constraint}"))
                }
                _ => {
                    tracing::error!(error = %db_err, entity, "Database error");
                    StoreError::Unavailable(db_err.to_string())
                }
            }
        }
        sqlx::Error::ColumnDecode { index, source } => StoreError::Decode {
            entity,
            reason: format!("column {index}: {source}"),
        },
        sqlx::Error::Decode(source) => StoreError::Decode {
            entity,
            reason: source.to_string(),
        },
        other => {
            tracing::error!(error = %other, entity, "Database error");
            StoreError::Unavailable(other.to_string())
        }
    }
}

/// Curried form of [`classify`] for `map_err`.
pub fn classify_as(entity: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |err| classify(entity, err)
}
