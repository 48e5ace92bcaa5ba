//! External-chain events and the claims orchestrators make about them

use crate::error::{PeggyError, PeggyResult};
use crate::store::codec;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, IfIsHumanReadable};
use shared_crypto::keccak256;
use shared_types::{validate_denom, AccAddress, EthAddress, Hash, ValAddress, U256};
use std::fmt;

/// Kind of external event a claim refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    /// Tokens locked in the bridge contract for a chain account.
    Deposit,
    /// An outgoing batch executed by the bridge contract.
    WithdrawBatch,
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimType::Deposit => f.write_str("deposit"),
            ClaimType::WithdrawBatch => f.write_str("withdraw_batch"),
        }
    }
}

/// Event-specific content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPayload {
    Deposit {
        eth_sender: EthAddress,
        token_contract: EthAddress,
        receiver: AccAddress,
        amount: U256,
    },
    WithdrawBatch {
        batch_nonce: u64,
        token_contract: EthAddress,
        denom: String,
    },
}

/// An event observed on the external chain, as reported by an orchestrator.
///
/// Everything here is part of the payload hash. The reporting orchestrator
/// is not, so agreeing validators produce identical hashes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthereumEvent {
    /// Position in the bridge contract's event stream, starting at 1.
    pub event_nonce: u64,
    /// External block that emitted the event.
    pub eth_block_height: u64,
    pub payload: ClaimPayload,
}

impl EthereumEvent {
    pub fn claim_type(&self) -> ClaimType {
        match self.payload {
            ClaimPayload::Deposit { .. } => ClaimType::Deposit,
            ClaimPayload::WithdrawBatch { .. } => ClaimType::WithdrawBatch,
        }
    }

    /// keccak256 over the bincode encoding of the event.
    pub fn payload_hash(&self) -> PeggyResult<Hash> {
        Ok(keccak256(&codec::encode(self)?))
    }

    /// Stateless checks.
    pub fn validate_basic(&self) -> PeggyResult<()> {
        if self.event_nonce == 0 {
            return Err(PeggyError::InvalidClaim("event nonce must start at 1".into()));
        }
        match &self.payload {
            ClaimPayload::Deposit {
                token_contract,
                amount,
                ..
            } => {
                if token_contract.is_zero() {
                    return Err(PeggyError::InvalidClaim("deposit token contract is zero".into()));
                }
                if amount.is_zero() {
                    return Err(PeggyError::InvalidClaim("deposit amount is zero".into()));
                }
            }
            ClaimPayload::WithdrawBatch {
                batch_nonce, denom, ..
            } => {
                if *batch_nonce == 0 {
                    return Err(PeggyError::InvalidClaim("batch nonce must start at 1".into()));
                }
                validate_denom(denom)?;
            }
        }
        Ok(())
    }
}

/// One orchestrator's vote for one event.
///
/// Stored per validator next to the attestation it counts toward, so the
/// key that cast each vote survives later rotations.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub event_nonce: u64,
    pub claim_type: ClaimType,
    pub orchestrator: AccAddress,
    pub validator: ValAddress,
    #[serde_as(as = "IfIsHumanReadable<Hex>")]
    pub payload_hash: Hash,
}

impl Claim {
    /// Build the claim `orchestrator` (acting for `validator`) makes about `event`.
    pub fn new(orchestrator: AccAddress, validator: ValAddress, event: &EthereumEvent) -> PeggyResult<Self> {
        Ok(Self {
            event_nonce: event.event_nonce,
            claim_type: event.claim_type(),
            orchestrator,
            validator,
            payload_hash: event.payload_hash()?,
        })
    }
}

/// Outcome of a successfully processed claim.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimOutcome {
    /// Vote counted; the attestation has not reached quorum.
    Pending { power: u64, required: u64 },
    /// Vote counted and the attestation finalized in this transaction.
    Observed {
        #[serde_as(as = "Hex")]
        payload_hash: Hash,
    },
    /// Vote recorded for a future nonce; counted once earlier nonces are observed.
    Buffered,
    /// Validator already voted on this nonce; nothing changed.
    DuplicateVote,
    /// Nonce already observed with this payload; nothing changed.
    AlreadyObserved,
}
