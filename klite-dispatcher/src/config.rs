use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::interval::Interval;

/// The dispatcher's configuration tree: topics, each mapping to one or
/// more named consumer groups, each with its own partition assignment,
/// sink endpoint, and pacing. Deserialized straight from a JSON document;
/// there is no environment-variable coupling at this layer, by design —
/// that belongs to the binary that loads this config, not the core.
///
/// Unknown keys are rejected rather than silently ignored, so a typo in a
/// config file surfaces at startup instead of producing a group that
/// silently never assigns any partitions.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    pub topics: HashMap<String, TopicSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopicSpec {
    #[serde(rename = "consumerGroups", default)]
    pub consumer_groups: HashMap<String, GroupSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    pub partitions: Vec<i32>,
    pub endpoint: String,
    #[serde(rename = "batchSize")]
    pub batch_size: i64,
    pub interval: Interval,
}

impl WorkerConfig {
    /// Parse a dispatcher configuration document. A missing `topics` key
    /// is a fatal configuration error at startup; an empty `topics` object
    /// is accepted (the dispatcher simply has no pumps to run).
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|error| {
            if error.to_string().contains("missing field `topics`") {
                ConfigError::NoTopics
            } else {
                ConfigError::Parse(error.to_string())
            }
        })
    }
}
