use klite_store::Message;
use serde::Serialize;

/// The JSON body posted to a group's sink endpoint. One message's shape on
/// the wire mirrors [`klite_store::Message`] field-for-field; kept as its
/// own type so the wire contract can evolve independently of the store's
/// internal representation.
#[derive(Debug, Serialize)]
pub struct SinkRequest<'a> {
    pub topic: &'a str,
    pub partition: i32,
    pub messages: Vec<SinkMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SinkMessage<'a> {
    pub offset: i64,
    pub data: &'a serde_json::Value,
    pub created: chrono::DateTime<chrono::Utc>,
}

impl<'a> SinkRequest<'a> {
    pub fn new(topic: &'a str, partition: i32, messages: &'a [Message]) -> Self {
        Self {
            topic,
            partition,
            messages: messages
                .iter()
                .map(|m| SinkMessage {
                    offset: m.offset,
                    data: &m.data,
                    created: m.created,
                })
                .collect(),
        }
    }
}
