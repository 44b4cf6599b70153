use crate::error::{StoreError, StoreResult};

/// Compute the SQL identifier for a (topic, partition) pair's table, quoted
/// so that punctuation in `topic` (e.g. hyphens) is safe to embed. Topics
/// containing a double-quote character are rejected outright, since they
/// cannot be safely quoted as an identifier.
pub fn quoted_partition_table(topic: &str, partition: i32) -> StoreResult<String> {
    if topic.contains('"') {
        return Err(StoreError::InvalidTopicName(topic.to_owned()));
    }
    Ok(format!("\"klite_{topic}_{partition}\""))
}

pub const OFFSETS_TABLE: &str = "klite_consumer_offsets";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_hyphenated_topics() {
        let name = quoted_partition_table("page-views", 3).unwrap();
        assert_eq!(name, "\"klite_page-views_3\"");
    }

    #[test]
    fn rejects_topics_with_quote_characters() {
        let err = quoted_partition_table("weird\"topic", 0).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTopicName(_)));
    }
}
