//! Crypto error types.

use shared_types::EthAddress;
use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Signature bytes are not 65 bytes of r || s || v, or r/s are out of range.
    #[error("Invalid signature format")]
    InvalidSignatureFormat,

    /// S is in the upper half of the curve order (EIP-2).
    #[error("Malleable signature: s is not in the lower half of the curve order")]
    MalleableSignature,

    /// Recovery id is not one of 0, 1, 27, 28.
    #[error("Invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    /// Public key recovery failed.
    #[error("Public key recovery failed")]
    RecoveryFailed,

    /// Recovered signer differs from the expected address.
    #[error("Signer mismatch: expected {expected}, recovered {actual}")]
    SignerMismatch {
        /// Address the signature was supposed to come from
        expected: EthAddress,
        /// Address actually recovered
        actual: EthAddress,
    },

    /// Private key bytes are not a valid secp256k1 scalar.
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Signing failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Hex input could not be decoded.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}
