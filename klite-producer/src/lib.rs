//! The producer side of klite: coalesces concurrent sends to the same
//! (topic, partition) into one atomic multi-row insert, with an escape
//! hatch (`send_batch`) for callers that want to skip the linger window
//! entirely.

mod config;
mod error;
mod pending;
mod producer;

pub use config::ProducerConfig;
pub use error::{ProducerError, ProducerResult, SharedProducerError};
pub use producer::Producer;
