//! Driving Ports (API - Inbound)
//!
//! The host drives the module through [`MsgServer`] (state transitions) and
//! [`PeggyQuery`] (read-only lookups). Both take the store explicitly: the
//! module itself holds no consensus state.

use crate::config::PeggyParams;
use crate::domain::{
    AbortedBatch, Attestation, BatchConfirmation, Claim, ClaimOutcome, ConfirmOutcome, ForkEvidence, NonceStream,
    OrchestratorDelegation, OutgoingTransferTx, OutgoingTxBatch,
};
use crate::error::PeggyResult;
use crate::events::PeggyEvent;
use crate::msgs::PeggyMsg;
use crate::ports::outbound::KvStore;
use serde::{Deserialize, Serialize};
use shared_types::{AccAddress, EthAddress, Hash, ValAddress};

/// Message-specific part of a successful transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsgResponse {
    Delegated,
    Claim(ClaimOutcome),
    Queued { tx_id: u64 },
    BatchCreated { batch_nonce: u64, tx_count: usize },
    Confirm(ConfirmOutcome),
}

/// Response plus the events the transaction emitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxResult {
    pub response: MsgResponse,
    pub events: Vec<PeggyEvent>,
}

/// Primary Peggy API
///
/// Every call is atomic: on `Err` nothing it wrote is visible in `store`.
pub trait MsgServer: Send + Sync {
    /// Execute one message at `block_height`.
    fn deliver(&self, store: &mut dyn KvStore, block_height: u64, msg: &PeggyMsg) -> PeggyResult<TxResult>;

    /// End-of-block housekeeping: time out expired batches and retry
    /// finalization of the next expected event nonce.
    fn end_block(&self, store: &mut dyn KvStore, block_height: u64) -> PeggyResult<Vec<PeggyEvent>>;
}

/// Read-only lookups.
pub trait PeggyQuery: Send + Sync {
    fn params(&self, store: &dyn KvStore) -> PeggyResult<PeggyParams>;

    fn delegation_by_validator(
        &self,
        store: &dyn KvStore,
        validator: &ValAddress,
    ) -> PeggyResult<Option<OrchestratorDelegation>>;

    fn validator_by_orchestrator(&self, store: &dyn KvStore, orchestrator: &AccAddress)
        -> PeggyResult<Option<ValAddress>>;

    fn validator_by_eth_address(&self, store: &dyn KvStore, eth_address: &EthAddress)
        -> PeggyResult<Option<ValAddress>>;

    fn attestation(&self, store: &dyn KvStore, event_nonce: u64, payload_hash: &Hash)
        -> PeggyResult<Option<Attestation>>;

    /// Attestations of a nonce in arrival order.
    fn attestations_for_nonce(&self, store: &dyn KvStore, event_nonce: u64) -> PeggyResult<Vec<Attestation>>;

    /// Individual votes behind one attestation, with the orchestrator that cast each.
    fn claims(&self, store: &dyn KvStore, event_nonce: u64, payload_hash: &Hash) -> PeggyResult<Vec<Claim>>;

    fn last_observed_event_nonce(&self, store: &dyn KvStore) -> PeggyResult<u64>;

    /// Highest event nonce the validator has claimed; orchestrators resume from here.
    fn last_event_nonce_by_validator(&self, store: &dyn KvStore, validator: &ValAddress) -> PeggyResult<u64>;

    fn last_observed_eth_height(&self, store: &dyn KvStore) -> PeggyResult<u64>;

    /// Pooled transfers of a denom in batch-selection order.
    fn pool_transactions(&self, store: &dyn KvStore, denom: &str) -> PeggyResult<Vec<OutgoingTransferTx>>;

    fn batch(&self, store: &dyn KvStore, denom: &str, batch_nonce: u64) -> PeggyResult<Option<OutgoingTxBatch>>;

    fn pending_batch(&self, store: &dyn KvStore, denom: &str) -> PeggyResult<Option<OutgoingTxBatch>>;

    fn batch_confirms(&self, store: &dyn KvStore, denom: &str, batch_nonce: u64)
        -> PeggyResult<Vec<BatchConfirmation>>;

    fn aborted_batches(&self, store: &dyn KvStore, denom: &str) -> PeggyResult<Vec<AbortedBatch>>;

    fn next_expected(&self, store: &dyn KvStore, stream: &NonceStream) -> PeggyResult<u64>;

    /// Most recent evidence recorded by this node, oldest first.
    fn fork_evidence(&self) -> Vec<ForkEvidence>;
}
