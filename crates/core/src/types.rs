/// Sessions are keyed by random UUIDs so ids cannot be enumerated.
pub type SessionId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
