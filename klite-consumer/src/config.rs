/// Consumer-level configuration: which named group this consumer commits
/// offsets under. Groups are otherwise unstructured; klite does not
/// validate group names beyond what SQLite accepts as a bound parameter.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub group: String,
}

impl ConsumerConfig {
    pub fn new(group: impl Into<String>) -> Self {
        Self { group: group.into() }
    }
}
