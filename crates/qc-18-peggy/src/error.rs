//! Error types for the Peggy bridge module
//!
//! Every variant belongs to exactly one [`ErrorKind`]. All of them are
//! transaction failures: the host discards the transaction's writes and keeps
//! running.

use shared_crypto::CryptoError;
use shared_types::{AddressError, Hash};
use thiserror::Error;

/// Error taxonomy used by hosts to decide how to surface a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input. Resubmit with corrected data.
    Validation,
    /// Nonce out of sequence. Resubmit in order.
    Ordering,
    /// Conflicts with existing state. Existing state is untouched.
    Conflict,
    /// Sender is not authorized (unknown or undelegated).
    Authorization,
    /// Conflicting finalized payloads. Flagged for governance.
    ForkEvidence,
    /// Committed module state could not be decoded.
    Storage,
}

/// Peggy module errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeggyError {
    // ---------------------------------------------------------------- validation
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("invalid signature: {0}")]
    InvalidSignature(#[from] CryptoError),

    #[error("invalid delegation proof for {validator}: {reason}")]
    InvalidProof { validator: String, reason: String },

    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    #[error("bridge fee {fee} below minimum {min}")]
    FeeTooLow { fee: String, min: String },

    #[error("amount denom {amount} does not match fee denom {fee}")]
    DenomMismatch { amount: String, fee: String },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("insufficient funds: {address} has {available}{denom}, needs {needed}{denom}")]
    InsufficientFunds {
        address: String,
        denom: String,
        available: String,
        needed: String,
    },

    #[error("invalid claim: {0}")]
    InvalidClaim(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("no pooled transfers for {denom}")]
    EmptyPool { denom: String },

    #[error("unknown batch {denom}/{batch_nonce}")]
    UnknownBatch { denom: String, batch_nonce: u64 },

    // ------------------------------------------------------------------ ordering
    #[error("event nonce {nonce} already processed, next expected is {expected}")]
    NonceOutOfOrder { nonce: u64, expected: u64 },

    #[error("event nonce {nonce} is ahead of next expected {expected}")]
    NonceTooHigh { nonce: u64, expected: u64 },

    #[error("nonce stream {stream} cannot advance from {last} to {nonce}")]
    NonceGap { stream: String, last: u64, nonce: u64 },

    // ------------------------------------------------------------------ conflict
    #[error("batch {denom}/{batch_nonce} is still pending")]
    BatchAlreadyPending { denom: String, batch_nonce: u64 },

    #[error("batch digest mismatch: stored {}, signed {}", hex::encode(.stored), hex::encode(.signed))]
    DigestMismatch { stored: Hash, signed: Hash },

    #[error("orchestrator {orchestrator} is already bound to {validator}")]
    OrchestratorAlreadyBound { orchestrator: String, validator: String },

    #[error("external address {eth_address} is already bound to {validator}")]
    EthAddressAlreadyBound { eth_address: String, validator: String },

    #[error("batch {denom}/{batch_nonce} does not expire before height {expires_at}")]
    BatchNotExpired {
        denom: String,
        batch_nonce: u64,
        expires_at: u64,
    },

    #[error("batch {denom}/{batch_nonce} is already finalized")]
    BatchAlreadyFinalized { denom: String, batch_nonce: u64 },

    #[error("batch {denom}/{batch_nonce} was already executed")]
    BatchAlreadyExecuted { denom: String, batch_nonce: u64 },

    // ------------------------------------------------------------- authorization
    #[error("no delegation for {0}")]
    NotDelegated(String),

    #[error("unknown or unbonded validator {0}")]
    UnknownValidator(String),

    // ------------------------------------------------------------- fork evidence
    #[error("conflicting claim for observed nonce {nonce}: observed {}, submitted {}", hex::encode(.observed), hex::encode(.submitted))]
    ConflictingClaim {
        nonce: u64,
        observed: Hash,
        submitted: Hash,
    },

    // ------------------------------------------------------------------- storage
    #[error("codec error: {0}")]
    Codec(String),

    #[error("corrupted state: {0}")]
    Corrupted(String),
}

impl PeggyError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        use PeggyError::*;
        match self {
            InvalidAddress(_) | InvalidSignature(_) | InvalidProof { .. }
            | InvalidDestination(_) | FeeTooLow { .. } | DenomMismatch { .. }
            | InvalidAmount(_) | InsufficientFunds { .. } | InvalidClaim(_)
            | InvalidParams(_) | EmptyPool { .. } | UnknownBatch { .. } => ErrorKind::Validation,
            NonceOutOfOrder { .. } | NonceTooHigh { .. } | NonceGap { .. } => ErrorKind::Ordering,
            BatchAlreadyPending { .. } | DigestMismatch { .. } | OrchestratorAlreadyBound { .. }
            | EthAddressAlreadyBound { .. } | BatchNotExpired { .. }
            | BatchAlreadyFinalized { .. } | BatchAlreadyExecuted { .. } => ErrorKind::Conflict,
            NotDelegated(_) | UnknownValidator(_) => ErrorKind::Authorization,
            ConflictingClaim { .. } => ErrorKind::ForkEvidence,
            Codec(_) | Corrupted(_) => ErrorKind::Storage,
        }
    }

    /// Short snake_case label, used as a metrics label.
    pub fn reason(&self) -> &'static str {
        use PeggyError::*;
        match self {
            InvalidAddress(_) => "invalid_address",
            InvalidSignature(_) => "invalid_signature",
            InvalidProof { .. } => "invalid_proof",
            InvalidDestination(_) => "invalid_destination",
            FeeTooLow { .. } => "fee_too_low",
            DenomMismatch { .. } => "denom_mismatch",
            InvalidAmount(_) => "invalid_amount",
            InsufficientFunds { .. } => "insufficient_funds",
            InvalidClaim(_) => "invalid_claim",
            InvalidParams(_) => "invalid_params",
            EmptyPool { .. } => "empty_pool",
            UnknownBatch { .. } => "unknown_batch",
            NonceOutOfOrder { .. } => "nonce_out_of_order",
            NonceTooHigh { .. } => "nonce_too_high",
            NonceGap { .. } => "nonce_gap",
            BatchAlreadyPending { .. } => "batch_already_pending",
            DigestMismatch { .. } => "digest_mismatch",
            OrchestratorAlreadyBound { .. } => "orchestrator_already_bound",
            EthAddressAlreadyBound { .. } => "eth_address_already_bound",
            BatchNotExpired { .. } => "batch_not_expired",
            BatchAlreadyFinalized { .. } => "batch_already_finalized",
            BatchAlreadyExecuted { .. } => "batch_already_executed",
            NotDelegated(_) => "not_delegated",
            UnknownValidator(_) => "unknown_validator",
            ConflictingClaim { .. } => "conflicting_claim",
            Codec(_) => "codec",
            Corrupted(_) => "corrupted",
        }
    }
}

/// Result type for Peggy operations
pub type PeggyResult<T> = Result<T, PeggyError>;
