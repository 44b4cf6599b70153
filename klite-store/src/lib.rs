//! The store adapter: table naming, schema creation, and ordered reads and
//! writes against a SQLite-backed partition log and consumer offset table.
//! Everything above the SQL layer — batching, decoding, group semantics —
//! is the concern of `klite-producer`, `klite-consumer`, and
//! `klite-dispatcher`.

mod error;
mod message;
mod raw;
mod store;
mod table;

pub use error::{StoreError, StoreResult};
pub use message::Message;
pub use raw::RawMessage;
pub use store::Store;
pub use table::{quoted_partition_table, OFFSETS_TABLE};
