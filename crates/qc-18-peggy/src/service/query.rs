//! Read-only queries

use super::PeggyService;
use crate::config::PeggyParams;
use crate::domain::{
    select_by_priority, AbortedBatch, Attestation, BatchConfirmation, Claim, ForkEvidence, NonceStream,
    OrchestratorDelegation, OutgoingTransferTx, OutgoingTxBatch,
};
use crate::error::PeggyResult;
use crate::ports::inbound::PeggyQuery;
use crate::ports::outbound::{AccountKeeper, BankKeeper, ClaimHandler, KvStore, StakingKeeper};
use crate::store;
use shared_types::{AccAddress, EthAddress, Hash, ValAddress};

impl<B, S, A, H> PeggyQuery for PeggyService<B, S, A, H>
where
    B: BankKeeper,
    S: StakingKeeper,
    A: AccountKeeper,
    H: ClaimHandler,
{
    fn params(&self, store: &dyn KvStore) -> PeggyResult<PeggyParams> {
        store::params(store)
    }

    fn delegation_by_validator(
        &self,
        store: &dyn KvStore,
        validator: &ValAddress,
    ) -> PeggyResult<Option<OrchestratorDelegation>> {
        store::delegation(store, validator)
    }

    fn validator_by_orchestrator(
        &self,
        store: &dyn KvStore,
        orchestrator: &AccAddress,
    ) -> PeggyResult<Option<ValAddress>> {
        store::validator_by_orchestrator(store, orchestrator)
    }

    fn validator_by_eth_address(&self, store: &dyn KvStore, eth_address: &EthAddress) -> PeggyResult<Option<ValAddress>> {
        store::validator_by_eth_address(store, eth_address)
    }

    fn attestation(&self, store: &dyn KvStore, event_nonce: u64, payload_hash: &Hash) -> PeggyResult<Option<Attestation>> {
        store::attestation(store, event_nonce, payload_hash)
    }

    fn attestations_for_nonce(&self, store: &dyn KvStore, event_nonce: u64) -> PeggyResult<Vec<Attestation>> {
        store::attestations_for_nonce(store, event_nonce)
    }

    fn claims(&self, store: &dyn KvStore, event_nonce: u64, payload_hash: &Hash) -> PeggyResult<Vec<Claim>> {
        store::claims_for_attestation(store, event_nonce, payload_hash)
    }

    fn last_observed_event_nonce(&self, store: &dyn KvStore) -> PeggyResult<u64> {
        Ok(store::nonce_cursor(store, &NonceStream::Event)?.last)
    }

    fn last_event_nonce_by_validator(&self, store: &dyn KvStore, validator: &ValAddress) -> PeggyResult<u64> {
        store::last_event_nonce_by_validator(store, validator)
    }

    fn last_observed_eth_height(&self, store: &dyn KvStore) -> PeggyResult<u64> {
        store::last_observed_eth_height(store)
    }

    fn pool_transactions(&self, store: &dyn KvStore, denom: &str) -> PeggyResult<Vec<OutgoingTransferTx>> {
        let pooled = store::pool_transactions(store, denom)?;
        let len = pooled.len();
        Ok(select_by_priority(pooled, len))
    }

    fn batch(&self, store: &dyn KvStore, denom: &str, batch_nonce: u64) -> PeggyResult<Option<OutgoingTxBatch>> {
        store::batch(store, denom, batch_nonce)
    }

    fn pending_batch(&self, store: &dyn KvStore, denom: &str) -> PeggyResult<Option<OutgoingTxBatch>> {
        match store::pending_batch_nonce(store, denom)? {
            Some(batch_nonce) => store::batch(store, denom, batch_nonce),
            None => Ok(None),
        }
    }

    fn batch_confirms(&self, store: &dyn KvStore, denom: &str, batch_nonce: u64) -> PeggyResult<Vec<BatchConfirmation>> {
        store::batch_confirms(store, denom, batch_nonce)
    }

    fn aborted_batches(&self, store: &dyn KvStore, denom: &str) -> PeggyResult<Vec<AbortedBatch>> {
        store::aborted_batches(store, denom)
    }

    fn next_expected(&self, store: &dyn KvStore, stream: &NonceStream) -> PeggyResult<u64> {
        Ok(store::nonce_cursor(store, stream)?.next_expected())
    }

    fn fork_evidence(&self) -> Vec<ForkEvidence> {
        self.evidence.read().iter().cloned().collect()
    }
}
