//! Events emitted by the Peggy module
//!
//! Returned to the host with each successful transaction. Events of a
//! failed transaction are dropped together with its writes.

use crate::domain::{ClaimType, EvidenceKind};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::{AccAddress, Coin, EthAddress, Hash, ValAddress};

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PeggyEvent {
    OrchestratorDelegated {
        validator: ValAddress,
        orchestrator: AccAddress,
        eth_address: EthAddress,
    },
    /// Previous delegation of a validator replaced by a new one.
    DelegationSuperseded {
        validator: ValAddress,
        previous_orchestrator: AccAddress,
        previous_eth_address: EthAddress,
    },
    ClaimSubmitted {
        event_nonce: u64,
        claim_type: ClaimType,
        validator: ValAddress,
        #[serde_as(as = "Hex")]
        payload_hash: Hash,
    },
    AttestationObserved {
        event_nonce: u64,
        claim_type: ClaimType,
        #[serde_as(as = "Hex")]
        payload_hash: Hash,
        power: u64,
    },
    ClaimHandlerFailed {
        event_nonce: u64,
        reason: String,
    },
    /// Evidence recorded while processing a claim.
    Misbehaviour {
        kind: EvidenceKind,
        event_nonce: u64,
        validator: ValAddress,
    },
    DepositMinted {
        receiver: AccAddress,
        coin: Coin,
    },
    DepositUnlocked {
        receiver: AccAddress,
        coin: Coin,
    },
    BatchExecuted {
        denom: String,
        batch_nonce: u64,
        burned: Coin,
    },
    TransferQueued {
        id: u64,
        sender: AccAddress,
        destination: EthAddress,
        amount: Coin,
        bridge_fee: Coin,
    },
    BatchCreated {
        denom: String,
        batch_nonce: u64,
        tx_count: usize,
        #[serde_as(as = "Hex")]
        digest: Hash,
    },
    BatchConfirmed {
        denom: String,
        batch_nonce: u64,
        validator: ValAddress,
    },
    BatchFinalized {
        denom: String,
        batch_nonce: u64,
        power: u64,
    },
    BatchTimedOut {
        denom: String,
        batch_nonce: u64,
        returned: Vec<u64>,
    },
}
