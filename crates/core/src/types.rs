/// Demo users are keyed by a small integer id.
pub type UserId = i64;

/// Generated documents are keyed by a random UUID.
pub type DocumentId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Free-form field values submitted for a document, keyed by data key.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;
