use thiserror::Error;

/// Configuration errors are fatal at startup: the worker never begins
/// running pumps if its configuration document cannot be trusted.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("dispatcher configuration has no `topics` key")]
    NoTopics,
    #[error("failed to parse dispatcher configuration: {0}")]
    Parse(String),
}

/// Errors a single pump can encounter while processing one partition.
/// Every variant here is caught by the pump loop, logged, and retried at
/// the next interval tick — none of these terminate the pump.
#[derive(Error, Debug)]
pub enum DispatcherError {
    #[error("store error: {0}")]
    Store(#[from] klite_store::StoreError),
    #[error("codec error: {0}")]
    Codec(#[from] klite_codec::CodecError),
    #[error("consumer error: {0}")]
    Consumer(#[from] klite_consumer::ConsumerError),
    #[error("sink request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("sink responded with non-success status {0}")]
    SinkRejected(reqwest::StatusCode),
}
