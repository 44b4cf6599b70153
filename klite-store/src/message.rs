use chrono::{DateTime, Utc};

/// A single record in a partition log, already decoded. This is the shape
/// callers outside the store actually work with: producers never see it,
/// consumers and the dispatcher do.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Message {
    /// 64-bit, dense, monotonically increasing offset within the partition.
    /// Assigned by the store at insert time; starts at 1.
    pub offset: i64,
    /// The decoded payload.
    pub data: serde_json::Value,
    /// Store-generated insertion timestamp.
    pub created: DateTime<Utc>,
}
