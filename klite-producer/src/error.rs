use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("store error: {0}")]
    Store(#[from] klite_store::StoreError),
    #[error("codec error: {0}")]
    Codec(#[from] klite_codec::CodecError),
    /// The batch this send was appended to was dropped without resolving
    /// the waiter, which should only happen if the flushing task panicked.
    #[error("producer batch was dropped before this send could be resolved")]
    BatchDropped,
}

pub type ProducerResult<T> = std::result::Result<T, ProducerError>;

/// The error type actually carried on a send waiter. A flush failure is
/// shared across every waiter in the batch, so the underlying
/// [`ProducerError`] is wrapped in an [`std::sync::Arc`] rather than
/// required to implement `Clone` itself.
pub type SharedProducerError = std::sync::Arc<ProducerError>;
