//! The klite dispatcher process: loads the dispatcher's topic/group
//! configuration, opens the SQLite store, and serves health and metrics
//! endpoints alongside the dispatcher's pumps until interrupted.
mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use envconfig::Envconfig;
use klite_codec::MessagePackCodec;
use klite_common::health::HealthRegistry;
use klite_common::metrics::{serve, setup_metrics_router};
use klite_dispatcher::{Dispatcher, WorkerConfig};
use klite_store::Store;
use tokio_util::sync::CancellationToken;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("Invalid configuration:");

    let dispatcher_config_raw = std::fs::read_to_string(&config.dispatcher_config_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", config.dispatcher_config_path));
    let dispatcher_config =
        WorkerConfig::from_json(&dispatcher_config_raw).expect("invalid dispatcher configuration");

    let store = Store::connect(&config.database_url(), config.max_sqlite_connections)
        .await
        .expect("failed to open klite store");

    let health = HealthRegistry::new("liveness");
    let cancel = CancellationToken::new();

    let dispatcher = Dispatcher::new(
        dispatcher_config,
        store,
        Arc::new(MessagePackCodec),
        health.clone(),
        cancel.clone(),
    )
    .with_request_timeout_ceiling(Duration::from_millis(config.request_timeout_ms));

    let router = Router::new()
        .route("/", get(index))
        .route("/_readiness", get(index))
        .route("/_liveness", get(move || std::future::ready(health.get_status())));
    let router = setup_metrics_router().merge(router);

    let bind = config.bind();
    tokio::task::spawn(async move {
        serve(router, &bind)
            .await
            .expect("failed to start serving metrics");
    });

    let dispatcher_handle = tokio::spawn(dispatcher.run());

    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for ctrl-c");
    tracing::info!("shutdown signal received, stopping pumps");
    cancel.cancel();

    dispatcher_handle.await.expect("dispatcher task panicked");

    Ok(())
}

pub async fn index() -> &'static str {
    "klite dispatcher worker"
}
