//! # Shared Crypto - Bridge Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | Keccak-256, EIP-191 | Payload hashes, batch digests |
//! | `ecdsa` | secp256k1 (recoverable) | Orchestrator key proofs, batch confirmations |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **EIP-191**: personal-message prefix keeps signed bridge payloads from
//!   doubling as valid external-chain transactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{
    recover_address, verify_personal_signer, verify_signer, EthSignature, EthSigningKey,
};
pub use errors::CryptoError;
pub use hashing::{eth_signed_message_hash, keccak256, keccak256_concat};
