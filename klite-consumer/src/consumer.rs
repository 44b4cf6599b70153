use std::sync::Arc;

use dashmap::DashSet;
use klite_codec::Codec;
use klite_store::{Message, Store};
use tracing::warn;

use crate::config::ConsumerConfig;
use crate::error::ConsumerResult;

const DEFAULT_MAX_MESSAGES: i64 = 100;

/// Options for [`Consumer::fetch`]. Kept as its own type (rather than a
/// bare integer parameter) so new knobs can be added without breaking
/// callers, matching the rest of the workspace's preference for explicit
/// option structs over positional booleans or integers.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub max_messages: i64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_messages: DEFAULT_MAX_MESSAGES,
        }
    }
}

type PartitionKey = (String, i32);

/// Reads and commits offsets for one named consumer group. Cheap to clone:
/// every clone shares the same store handle and known-offset-row cache.
#[derive(Clone)]
pub struct Consumer {
    store: Store,
    codec: Arc<dyn Codec>,
    config: ConsumerConfig,
    /// (topic, partition) pairs this consumer already knows has an offset
    /// row, so a subsequent commit can go straight to UPDATE instead of
    /// attempting an INSERT that is certain to violate the primary key.
    known_offset_rows: Arc<DashSet<PartitionKey>>,
}

impl Consumer {
    pub fn new(store: Store, codec: Arc<dyn Codec>, config: ConsumerConfig) -> Self {
        Self {
            store,
            codec,
            config,
            known_offset_rows: Arc::new(DashSet::new()),
        }
    }

    pub fn group(&self) -> &str {
        &self.config.group
    }

    pub async fn ensure_offset_table(&self) -> ConsumerResult<()> {
        self.store.ensure_offsets_table().await?;
        Ok(())
    }

    /// The last committed offset for (topic, partition) under this
    /// consumer's group, or `-1` if no commit has ever been recorded.
    pub async fn get_last_offset(&self, topic: &str, partition: i32) -> ConsumerResult<i64> {
        let offset = self
            .store
            .get_commit_offset(&self.config.group, topic, partition)
            .await?;
        Ok(offset.unwrap_or(-1))
    }

    /// Fetch up to `options.max_messages` decoded messages strictly after
    /// the group's last committed offset for (topic, partition), ordered
    /// ascending. A partition that has never been produced to (no table
    /// yet) yields an empty list rather than an error.
    pub async fn fetch(
        &self,
        topic: &str,
        partition: i32,
        options: FetchOptions,
    ) -> ConsumerResult<Vec<Message>> {
        let after = self.get_last_offset(topic, partition).await?;

        let raw = match self
            .store
            .fetch_after(topic, partition, after, options.max_messages)
            .await
        {
            Ok(rows) => rows,
            Err(error) if error.is_no_such_table() => return Ok(Vec::new()),
            Err(error) => return Err(error.into()),
        };

        raw.into_iter()
            .map(|row| {
                let data = self.codec.decode(&row.data)?;
                Ok(Message {
                    offset: row.offset,
                    data,
                    created: row.created,
                })
            })
            .collect()
    }

    /// Record `offset` as committed for (topic, partition) under this
    /// group. The stored value is monotonically non-decreasing: committing
    /// an offset lower than one already recorded leaves the higher value
    /// in place rather than regressing progress.
    pub async fn commit(&self, topic: &str, partition: i32, offset: i64) -> ConsumerResult<()> {
        let key = (topic.to_owned(), partition);

        if self.known_offset_rows.contains(&key) {
            self.store
                .update_commit_offset(&self.config.group, topic, partition, offset)
                .await?;
            return Ok(());
        }

        match self
            .store
            .insert_commit_offset(&self.config.group, topic, partition, offset)
            .await
        {
            Ok(()) => {
                self.known_offset_rows.insert(key);
                Ok(())
            }
            Err(error) if error.is_unique_violation() => {
                warn!(
                    group = %self.config.group,
                    topic,
                    partition,
                    "lost race to create consumer offset row, falling back to update"
                );
                self.known_offset_rows.insert(key);
                self.store
                    .update_commit_offset(&self.config.group, topic, partition, offset)
                    .await?;
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }
}

impl std::fmt::Debug for Consumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("group", &self.config.group)
            .finish_non_exhaustive()
    }
}
