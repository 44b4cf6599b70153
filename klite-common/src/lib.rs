//! Ambient stack shared by every klite crate: liveness reporting and a
//! Prometheus metrics router, in the style used throughout the service.

pub mod health;
pub mod metrics;
