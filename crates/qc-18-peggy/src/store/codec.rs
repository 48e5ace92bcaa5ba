//! Value encoding
//!
//! Stored values are bincode; counters are raw big-endian u64.

use crate::error::{PeggyError, PeggyResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn encode<T: Serialize + ?Sized>(value: &T) -> PeggyResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| PeggyError::Codec(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> PeggyResult<T> {
    bincode::deserialize(bytes).map_err(|e| PeggyError::Corrupted(e.to_string()))
}

pub fn encode_u64(value: u64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

pub fn decode_u64(bytes: &[u8]) -> PeggyResult<u64> {
    let array: [u8; 8] = bytes
        .try_into()
        .map_err(|_| PeggyError::Corrupted(format!("expected 8-byte counter, got {} bytes", bytes.len())))?;
    Ok(u64::from_be_bytes(array))
}
