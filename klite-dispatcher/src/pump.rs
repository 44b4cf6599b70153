use std::sync::Arc;

use klite_codec::Codec;
use klite_common::health::HealthHandle;
use klite_consumer::{Consumer, ConsumerConfig, FetchOptions};
use klite_store::Store;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::GroupSpec;
use crate::error::DispatcherError;
use crate::sink::SinkRequest;

/// Fetch up to `batch_size` undelivered messages for (topic, partition)
/// under `consumer`'s group, POST them to `endpoint`, and commit the last
/// delivered offset only on a 2xx response. Every error here is non-fatal
/// and reported back to the caller for logging; the pump continues at its
/// configured interval regardless of the outcome (no backoff, no retry
/// cap — delivery is at-least-once and redelivers on the next tick).
pub async fn process_partition(
    consumer: &Consumer,
    client: &reqwest::Client,
    topic: &str,
    partition: i32,
    endpoint: &str,
    batch_size: i64,
) -> Result<(), DispatcherError> {
    let messages = consumer
        .fetch(topic, partition, FetchOptions { max_messages: batch_size })
        .await?;

    if messages.is_empty() {
        return Ok(());
    }

    let body = SinkRequest::new(topic, partition, &messages);

    let response = client.post(endpoint).json(&body).send().await?;

    if !response.status().is_success() {
        return Err(DispatcherError::SinkRejected(response.status()));
    }

    let last_offset = messages
        .last()
        .expect("messages is non-empty")
        .offset;
    consumer.commit(topic, partition, last_offset).await?;

    Ok(())
}

/// Run one (topic, group) pump to completion. A pump never returns on its
/// own except when `cancel` fires: it runs `process_partition` over every
/// assigned partition concurrently, waits for all of them, then sleeps the
/// configured interval before the next round — the same interval whether
/// the previous round succeeded or errored.
#[allow(clippy::too_many_arguments)]
pub async fn run_pump(
    topic: String,
    group: String,
    spec: GroupSpec,
    store: Store,
    codec: Arc<dyn Codec>,
    client: reqwest::Client,
    liveness: HealthHandle,
    cancel: CancellationToken,
) {
    let consumer = Consumer::new(store, codec, ConsumerConfig::new(group.clone()));
    if let Err(error) = consumer.ensure_offset_table().await {
        error!(topic, group, "failed to prepare consumer offset table: {error}");
        return;
    }

    info!(topic, group, partitions = ?spec.partitions, "pump starting");

    loop {
        liveness.report_healthy().await;

        let results = futures::future::join_all(spec.partitions.iter().map(|&partition| {
            let consumer = &consumer;
            let client = &client;
            let endpoint = &spec.endpoint;
            async move {
                (
                    partition,
                    process_partition(consumer, client, &topic, partition, endpoint, spec.batch_size)
                        .await,
                )
            }
        }))
        .await;

        for (partition, result) in results {
            if let Err(error) = result {
                warn!(topic, group, partition, "dispatch failed, will retry next interval: {error}");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(spec.interval.as_duration()) => {}
            _ = cancel.cancelled() => {
                info!(topic, group, "pump stopping");
                break;
            }
        }
    }
}
