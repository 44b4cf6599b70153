use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::DashSet;
use klite_codec::Codec;
use klite_store::Store;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::ProducerConfig;
use crate::error::{ProducerError, ProducerResult, SharedProducerError};
use crate::pending::PendingBatch;

type PartitionKey = (String, i32);

struct BatchState {
    pending: Mutex<PendingBatch>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl BatchState {
    fn new() -> Self {
        Self {
            pending: Mutex::new(PendingBatch::new()),
            timer: Mutex::new(None),
        }
    }
}

struct ProducerInner {
    store: Store,
    codec: Arc<dyn Codec>,
    config: ProducerConfig,
    batches: DashMap<PartitionKey, Arc<BatchState>>,
    known_tables: DashSet<PartitionKey>,
}

/// Coalesces concurrent sends to the same (topic, partition) into a single
/// transactional multi-row insert. Cheap to clone: every clone shares the
/// same pending-batch state, store handle, and codec.
#[derive(Clone)]
pub struct Producer {
    inner: Arc<ProducerInner>,
}

impl Producer {
    pub fn new(store: Store, codec: Arc<dyn Codec>, config: ProducerConfig) -> Self {
        Self {
            inner: Arc::new(ProducerInner {
                store,
                codec,
                config,
                batches: DashMap::new(),
                known_tables: DashSet::new(),
            }),
        }
    }

    async fn ensure_table(&self, topic: &str, partition: i32) -> ProducerResult<()> {
        let key = (topic.to_owned(), partition);
        if self.inner.known_tables.contains(&key) {
            return Ok(());
        }
        self.inner.store.ensure_partition_table(topic, partition).await?;
        self.inner.known_tables.insert(key);
        Ok(())
    }

    fn batch_state(&self, key: &PartitionKey) -> Arc<BatchState> {
        self.inner
            .batches
            .entry(key.clone())
            .or_insert_with(|| Arc::new(BatchState::new()))
            .clone()
    }

    /// Append `payload` to the pending batch for (topic, partition),
    /// resetting its linger timer, and wait for the batch it ends up in to
    /// be flushed. Resolves to the offset assigned to this payload.
    pub async fn send(
        &self,
        topic: &str,
        partition: i32,
        payload: &serde_json::Value,
    ) -> Result<i64, SharedProducerError> {
        self.ensure_table(topic, partition)
            .await
            .map_err(Arc::new)?;

        let encoded = self
            .inner
            .codec
            .encode(payload)
            .map_err(|e| Arc::new(ProducerError::from(e)))?;

        let key = (topic.to_owned(), partition);
        let state = self.batch_state(&key);

        let rx = {
            let mut pending = state.pending.lock().await;
            pending.push(encoded)
        };

        self.arm_timer(key, state.clone()).await;

        rx.await
            .unwrap_or_else(|_| Err(Arc::new(ProducerError::BatchDropped)))
    }

    async fn arm_timer(&self, key: PartitionKey, state: Arc<BatchState>) {
        let delay = Duration::from_millis(self.inner.config.batch_delay_ms);
        let producer = self.clone();
        let flush_state = state.clone();

        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            } else {
                tokio::task::yield_now().await;
            }
            producer.flush_state(&key, &flush_state).await;
        });

        // The previous timer's eventual flush is a no-op if this send's
        // timer (or a sendBatch bypass) already drained the batch first.
        let previous = state.timer.lock().await.replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    async fn flush_state(&self, key: &PartitionKey, state: &Arc<BatchState>) {
        let (payloads, waiters) = {
            let mut pending = state.pending.lock().await;
            if pending.is_empty() {
                return;
            }
            pending.take()
        };

        self.complete_batch(&key.0, key.1, payloads, waiters).await;
    }

    async fn complete_batch(
        &self,
        topic: &str,
        partition: i32,
        payloads: Vec<Vec<u8>>,
        waiters: Vec<tokio::sync::oneshot::Sender<crate::pending::SendResult>>,
    ) {
        match self.inner.store.insert_batch(topic, partition, &payloads).await {
            Ok((first_offset, _count)) => {
                for (i, waiter) in waiters.into_iter().enumerate() {
                    let _ = waiter.send(Ok(first_offset + i as i64));
                }
            }
            Err(error) => {
                let shared: SharedProducerError = Arc::new(ProducerError::from(error));
                for waiter in waiters {
                    let _ = waiter.send(Err(shared.clone()));
                }
            }
        }
    }

    /// Insert `payloads` immediately, bypassing the auto-batching linger
    /// timer entirely. Does not disturb any batch currently accumulating
    /// for the same (topic, partition) via [`Producer::send`].
    pub async fn send_batch(
        &self,
        topic: &str,
        partition: i32,
        payloads: &[serde_json::Value],
    ) -> ProducerResult<i64> {
        self.ensure_table(topic, partition).await?;

        let encoded = payloads
            .iter()
            .map(|p| self.inner.codec.encode(p))
            .collect::<Result<Vec<_>, _>>()?;

        let (first_offset, _count) = self
            .inner
            .store
            .insert_batch(topic, partition, &encoded)
            .await?;

        Ok(first_offset)
    }

    /// Drain every pending batch across every (topic, partition) this
    /// producer instance has sent to, regardless of its linger timer.
    pub async fn flush(&self) {
        let keys: Vec<PartitionKey> = self
            .inner
            .batches
            .iter()
            .map(|entry| entry.key().clone())
            .collect();

        for key in keys {
            let state = self.batch_state(&key);
            if let Some(handle) = state.timer.lock().await.take() {
                handle.abort();
            }
            self.flush_state(&key, &state).await;
        }
    }
}

impl std::fmt::Debug for Producer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer").finish_non_exhaustive()
    }
}
