//! Domain module for the Peggy bridge
//!
//! ## Core Modules
//! - delegation: Orchestrator key delegation and custody proofs
//! - claim: External events and orchestrator claims
//! - attestation: Power aggregation and winner selection
//! - transfer: Outgoing transfers and pool ordering
//! - batch: Outgoing batches, digests and confirmations
//! - nonce: Gap-free nonce streams
//! - evidence: Fork and equivocation records

pub mod attestation;
pub mod batch;
pub mod claim;
pub mod delegation;
pub mod evidence;
pub mod nonce;
pub mod transfer;

pub use attestation::{select_winner, Attestation};
pub use batch::{
    batch_digest, AbortedBatch, BatchConfirmation, BatchStatus, ConfirmOutcome, OutgoingTxBatch,
};
pub use claim::{Claim, ClaimOutcome, ClaimPayload, ClaimType, EthereumEvent};
pub use delegation::{
    sign_delegation, verify_delegation_proof, OrchestratorDelegation,
    SetOrchestratorAddressesSignMsg,
};
pub use evidence::{EvidenceKind, ForkEvidence};
pub use nonce::{NonceCursor, NoncePosition, NonceStream};
pub use transfer::{
    parse_destination, select_by_priority, validate_amount_and_fee, voucher_denom, OutgoingTransferTx,
    TransferPriority,
};
