//! Opaque binary encoding for message payloads.
//!
//! The store only ever sees bytes; producers and consumers agree on a codec
//! out of band. [`serde_json::Value`] is used as the canonical in-memory
//! representation since it losslessly covers scalars, strings, arrays, and
//! maps, and [`MessagePackCodec`] is the default wire encoding. Callers that
//! need a different wire format (and agree on it end to end for a given
//! store) can provide their own [`Codec`] implementation.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to encode payload: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode payload: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// A pluggable encoder/decoder for message payloads.
pub trait Codec: Send + Sync {
    fn encode(&self, payload: &Value) -> CodecResult<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> CodecResult<Value>;
}

/// MessagePack-backed codec. The reference codec for klite; any codec
/// providing a lossless round-trip over JSON-like values is acceptable
/// provided every producer and consumer sharing a store agrees on it.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessagePackCodec;

impl Codec for MessagePackCodec {
    fn encode(&self, payload: &Value) -> CodecResult<Vec<u8>> {
        Ok(rmp_serde::to_vec(payload)?)
    }

    fn decode(&self, bytes: &[u8]) -> CodecResult<Value> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
