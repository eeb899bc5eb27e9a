/// Record identifiers are `BIGSERIAL` keys assigned by Postgres.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
