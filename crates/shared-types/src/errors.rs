//! # Error Types
//!
//! Parsing and validation errors for the shared primitives.

use thiserror::Error;

/// Errors produced while parsing or validating addresses, denoms and coins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Input string was empty.
    #[error("empty address")]
    Empty,

    /// External address is missing its `0x` prefix.
    #[error("missing 0x prefix: {0}")]
    MissingPrefix(String),

    /// Input contained non-hex characters.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded byte length is wrong.
    #[error("invalid address length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Bech32 decoding failed.
    #[error("invalid bech32: {0}")]
    Bech32(String),

    /// Bech32 human-readable part did not match the address kind.
    #[error("wrong bech32 prefix: expected {expected}, got {actual}")]
    WrongPrefix { expected: String, actual: String },

    /// Denomination does not match the chain's denom grammar.
    #[error("invalid denom: {0}")]
    InvalidDenom(String),

    /// Coin string could not be split into amount and denom.
    #[error("invalid coin: {0}")]
    InvalidCoin(String),
}
