use chrono::{DateTime, Utc};

/// A partition row as read straight off disk: payload bytes not yet passed
/// through a codec. The store never looks inside `data`.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub offset: i64,
    pub data: Vec<u8>,
    pub created: DateTime<Utc>,
}
