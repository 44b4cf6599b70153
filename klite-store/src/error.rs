use thiserror::Error;

/// Enumeration of errors for operations against the SQLite-backed store.
/// Errors that originate from sqlx are wrapped to provide additional
/// context, the same shape as `hook_common::pgqueue::PgQueueError`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection failed with: {error}")]
    ConnectionError { error: sqlx::Error },
    #[error("{command} query failed with: {error}")]
    QueryError { command: String, error: sqlx::Error },
    #[error("topic {0:?} contains a quote character and cannot be used as a table name")]
    InvalidTopicName(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// True if this error is SQLite reporting that a partition table has
    /// never been created, i.e. the topic has no produced messages yet.
    /// This is not itself an error condition for a fetch: an empty stream
    /// is valid.
    pub fn is_no_such_table(&self) -> bool {
        match self {
            StoreError::QueryError { error, .. } => error
                .as_database_error()
                .map(|e| e.message().contains("no such table"))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// True if this error is SQLite reporting a unique constraint
    /// violation, i.e. two commits raced to insert the first offset row
    /// for a (group, topic, partition). Callers should fall back to an
    /// update in that case rather than treating it as fatal.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StoreError::QueryError { error, .. } => error
                .as_database_error()
                .map(|e| e.is_unique_violation())
                .unwrap_or(false),
            _ => false,
        }
    }

    pub(crate) fn query(command: &str, error: sqlx::Error) -> Self {
        StoreError::QueryError {
            command: command.to_owned(),
            error,
        }
    }
}
