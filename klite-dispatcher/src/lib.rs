//! The dispatcher worker: periodically drains assignments from the store
//! to an HTTP sink, at-least-once. Configuration is a static JSON
//! document describing topics, consumer groups, and sink endpoints; there
//! is no rebalancing, no heartbeat protocol, and no clustering — a pump
//! simply owns the partitions it was configured with for its whole life.

mod config;
mod dispatcher;
mod error;
mod interval;
mod pump;
mod sink;

pub use config::{GroupSpec, TopicSpec, WorkerConfig};
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, DispatcherError};
pub use interval::{Interval, IntervalParseError};
pub use pump::process_partition;
pub use sink::{SinkMessage, SinkRequest};

#[cfg(test)]
mod tests {
    use super::*;
    use klite_codec::MessagePackCodec;
    use klite_common::health::HealthRegistry;
    use klite_consumer::{Consumer, ConsumerConfig, FetchOptions};
    use klite_producer::{Producer, ProducerConfig};
    use klite_store::Store;
    use serde_json::json;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn parses_the_full_grammar() {
        let _: WorkerConfig = WorkerConfig::from_json(
            r#"{"topics": {"events": {"consumerGroups": {"g1": {"partitions": [0], "endpoint": "http://localhost", "batchSize": 10, "interval": "1s"}}}}}"#,
        )
        .unwrap();
    }

    #[test]
    fn missing_topics_key_is_a_fatal_config_error() {
        let err = WorkerConfig::from_json("{}").unwrap_err();
        assert!(matches!(err, ConfigError::NoTopics));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = WorkerConfig::from_json(
            r#"{"topics": {}, "unexpectedKey": true}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn config_grammar_round_trips() {
        parses_the_full_grammar();
    }

    async fn memory_store() -> Store {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite pool");
        Store::from_pool(pool)
    }

    #[tokio::test]
    async fn process_partition_commits_only_on_success() {
        let store = memory_store().await;
        let codec: Arc<dyn klite_codec::Codec> = Arc::new(MessagePackCodec);

        let producer = Producer::new(store.clone(), codec.clone(), ProducerConfig { batch_delay_ms: 0 });
        producer
            .send_batch("events", 0, &[json!("a"), json!("b")])
            .await
            .unwrap();

        let consumer = Consumer::new(store, codec, ConsumerConfig::new("dispatch-group"));
        consumer.ensure_offset_table().await.unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sink"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let endpoint = format!("{}/sink", server.uri());

        process_partition(&consumer, &client, "events", 0, &endpoint, 100)
            .await
            .unwrap();

        assert_eq!(consumer.get_last_offset("events", 0).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn process_partition_does_not_commit_on_non_2xx() {
        let store = memory_store().await;
        let codec: Arc<dyn klite_codec::Codec> = Arc::new(MessagePackCodec);

        let producer = Producer::new(store.clone(), codec.clone(), ProducerConfig { batch_delay_ms: 0 });
        producer.send_batch("events", 0, &[json!("a")]).await.unwrap();

        let consumer = Consumer::new(store, codec, ConsumerConfig::new("dispatch-group"));
        consumer.ensure_offset_table().await.unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sink"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let endpoint = format!("{}/sink", server.uri());

        let err = process_partition(&consumer, &client, "events", 0, &endpoint, 100)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatcherError::SinkRejected(_)));

        assert_eq!(consumer.get_last_offset("events", 0).await.unwrap(), -1);

        let still_pending = consumer
            .fetch("events", 0, FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(still_pending.len(), 1);
    }

    #[tokio::test]
    async fn process_partition_on_empty_partition_is_a_no_op() {
        let store = memory_store().await;
        let codec: Arc<dyn klite_codec::Codec> = Arc::new(MessagePackCodec);
        let consumer = Consumer::new(store, codec, ConsumerConfig::new("dispatch-group"));
        consumer.ensure_offset_table().await.unwrap();

        let client = reqwest::Client::new();
        // No mock server needed: an empty fetch must return before any request is sent.
        process_partition(&consumer, &client, "never-produced", 0, "http://127.0.0.1:1", 100)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dispatcher_runs_configured_pumps_until_cancelled() {
        let store = memory_store().await;
        let codec: Arc<dyn klite_codec::Codec> = Arc::new(MessagePackCodec);

        let producer = Producer::new(store.clone(), codec.clone(), ProducerConfig { batch_delay_ms: 0 });
        producer.send_batch("events", 0, &[json!("a")]).await.unwrap();

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let config = WorkerConfig::from_json(&format!(
            r#"{{"topics": {{"events": {{"consumerGroups": {{"g1": {{"partitions": [0], "endpoint": "{}/sink", "batchSize": 10, "interval": "50ms"}}}}}}}}}}"#,
            server.uri()
        ))
        .unwrap();

        let health = HealthRegistry::new("test");
        let cancel = CancellationToken::new();
        let dispatcher = Dispatcher::new(config, store, codec, health.clone(), cancel.clone());

        let handle = tokio::spawn(dispatcher.run());
        tokio::time::sleep(Duration::from_millis(150)).await;
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("dispatcher should resolve promptly after cancellation")
            .unwrap();

        assert!(health.get_status().healthy);
    }
}
