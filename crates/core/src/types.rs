/// Primary keys for campus entities are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Users are keyed by the UUID issued by the authentication provider.
pub type UserId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
