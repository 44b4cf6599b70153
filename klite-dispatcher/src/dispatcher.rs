use std::sync::Arc;
use std::time::Duration;

use klite_codec::Codec;
use klite_common::health::HealthRegistry;
use klite_store::Store;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::WorkerConfig;
use crate::pump::run_pump;

/// Owns the startup contract: validates the config, spawns one pump per
/// (topic, group), and resolves only once every pump has exited. Topics
/// with no configured consumer groups are warned about and skipped rather
/// than treated as fatal.
pub struct Dispatcher {
    config: WorkerConfig,
    store: Store,
    codec: Arc<dyn Codec>,
    health: HealthRegistry,
    cancel: CancellationToken,
    request_timeout_ceiling: Duration,
}

impl Dispatcher {
    pub fn new(
        config: WorkerConfig,
        store: Store,
        codec: Arc<dyn Codec>,
        health: HealthRegistry,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            store,
            codec,
            health,
            cancel,
            request_timeout_ceiling: Duration::from_secs(5),
        }
    }

    /// Override the outer ceiling placed on the per-request HTTP timeout.
    /// The effective timeout is the lesser of this ceiling and the
    /// fastest configured pump interval, so a single slow sink can never
    /// stall a pump well past its next scheduled round.
    pub fn with_request_timeout_ceiling(mut self, ceiling: Duration) -> Self {
        self.request_timeout_ceiling = ceiling;
        self
    }

    /// Build the shared HTTP client pumps deliver through. Pooled and
    /// reused across every pump.
    fn build_client(&self) -> reqwest::Client {
        let fastest_interval = self
            .config
            .topics
            .values()
            .flat_map(|t| t.consumer_groups.values())
            .map(|g| g.interval.as_duration())
            .min()
            .unwrap_or(self.request_timeout_ceiling);

        let timeout = fastest_interval.min(self.request_timeout_ceiling);

        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to construct reqwest client for dispatcher")
    }

    /// Run every configured pump until `cancel` fires, then wait for all
    /// of them to exit before returning.
    pub async fn run(self) {
        let client = self.build_client();
        let mut handles: Vec<JoinHandle<()>> = Vec::new();

        for (topic, spec) in self.config.topics {
            if spec.consumer_groups.is_empty() {
                warn!(topic, "topic has no consumer groups configured, skipping");
                continue;
            }

            for (group, group_spec) in spec.consumer_groups {
                let liveness = self
                    .health
                    .register(
                        format!("dispatcher:{topic}:{group}"),
                        time::Duration::seconds(
                            (group_spec.interval.as_duration().as_secs() as i64 * 3).max(30),
                        ),
                    )
                    .await;

                handles.push(tokio::spawn(run_pump(
                    topic.clone(),
                    group,
                    group_spec,
                    self.store.clone(),
                    self.codec.clone(),
                    client.clone(),
                    liveness,
                    self.cancel.clone(),
                )));
            }
        }

        for handle in handles {
            let _ = handle.await;
        }
    }
}
