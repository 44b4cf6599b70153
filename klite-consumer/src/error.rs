use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("store error: {0}")]
    Store(#[from] klite_store::StoreError),
    #[error("codec error: {0}")]
    Codec(#[from] klite_codec::CodecError),
}

pub type ConsumerResult<T> = std::result::Result<T, ConsumerError>;
