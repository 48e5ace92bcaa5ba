//! # Keccak-256 Hashing
//!
//! Ethereum's hash function, used for payload hashes, batch digests,
//! address derivation and the EIP-191 personal-message envelope.

use sha3::{Digest, Keccak256};
use shared_types::Hash;

/// Prefix of an EIP-191 personal message carrying a 32-byte hash.
pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak-256 of `data` (one-shot).
pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Keccak-256 over the concatenation of `inputs`.
pub fn keccak256_concat(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for input in inputs {
        hasher.update(input);
    }
    hasher.finalize().into()
}

/// Hash that an Ethereum wallet actually signs for a 32-byte message.
pub fn eth_signed_message_hash(message_hash: &Hash) -> Hash {
    keccak256_concat(&[ETH_SIGNED_MESSAGE_PREFIX, message_hash])
}
