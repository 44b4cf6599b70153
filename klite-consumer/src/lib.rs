//! The consumer side of klite: per-group offset tracking over the store's
//! partition logs. Fetching is always ordered and always relative to the
//! group's own last commit; committing is isolated per (group, topic,
//! partition) and safe against the first-commit race between two
//! consumer instances in the same group.

mod config;
mod consumer;
mod error;

pub use config::ConsumerConfig;
pub use consumer::{Consumer, FetchOptions};
pub use error::{ConsumerError, ConsumerResult};
