//! Genesis import and export
//!
//! Only primary records are exported. Reverse indexes and the pending-batch
//! index are rebuilt on import, so export -> import reproduces the module
//! keyspace byte for byte.

use super::ValidatorEventNonce;
use crate::config::PeggyParams;
use crate::domain::{
    AbortedBatch, Attestation, BatchConfirmation, Claim, NonceCursor, OrchestratorDelegation, OutgoingTransferTx,
    OutgoingTxBatch,
};
use crate::error::{PeggyError, PeggyResult};
use crate::ports::outbound::KvStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::info;

/// Complete module state in document form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: PeggyParams,
    pub delegations: Vec<OrchestratorDelegation>,
    pub attestations: Vec<Attestation>,
    #[serde(default)]
    pub claims: Vec<Claim>,
    pub nonce_streams: Vec<NonceCursor>,
    pub validator_event_nonces: Vec<ValidatorEventNonce>,
    pub last_observed_eth_height: u64,
    pub pool: Vec<OutgoingTransferTx>,
    pub last_pool_id: u64,
    pub batches: Vec<OutgoingTxBatch>,
    pub batch_confirms: Vec<BatchConfirmation>,
    pub aborted_batches: Vec<AbortedBatch>,
}

impl GenesisState {
    pub fn validate(&self) -> PeggyResult<()> {
        self.params.validate()?;

        let mut orchestrators = BTreeSet::new();
        let mut eth_addresses = BTreeSet::new();
        for d in &self.delegations {
            if !orchestrators.insert(d.orchestrator) || !eth_addresses.insert(d.eth_address) {
                return Err(invalid(format!("key of {} is delegated twice", d.validator)));
            }
        }

        for c in &self.claims {
            let counted = self.attestations.iter().any(|a| {
                a.event_nonce == c.event_nonce && a.payload_hash == c.payload_hash && a.has_vote(&c.validator)
            });
            if !counted {
                return Err(invalid(format!(
                    "claim of {} for nonce {} has no matching attestation vote",
                    c.validator, c.event_nonce
                )));
            }
        }

        if let Some(tx) = self.pool.iter().find(|tx| tx.id > self.last_pool_id) {
            return Err(invalid(format!(
                "pooled transfer {} exceeds last pool id {}",
                tx.id, self.last_pool_id
            )));
        }

        let mut pending = BTreeSet::new();
        for b in self.batches.iter().filter(|b| b.is_pending()) {
            if !pending.insert(b.denom.as_str()) {
                return Err(invalid(format!("more than one pending batch for {}", b.denom)));
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> PeggyResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| PeggyError::Codec(e.to_string()))
    }

    pub fn from_json(json: &str) -> PeggyResult<Self> {
        serde_json::from_str(json).map_err(|e| PeggyError::Codec(e.to_string()))
    }
}

fn invalid(reason: String) -> PeggyError {
    PeggyError::InvalidParams(format!("genesis: {reason}"))
}

/// Write `state` into an empty module keyspace.
pub fn init_genesis(store: &mut dyn KvStore, state: &GenesisState) -> PeggyResult<()> {
    state.validate()?;

    super::set_params(store, &state.params)?;
    for d in &state.delegations {
        super::set_delegation(store, d)?;
    }
    for a in &state.attestations {
        super::set_attestation(store, a)?;
    }
    for c in &state.claims {
        super::set_claim(store, c)?;
    }
    for cursor in &state.nonce_streams {
        super::set_nonce_cursor(store, cursor)?;
    }
    for record in &state.validator_event_nonces {
        super::set_last_event_nonce_by_validator(store, record)?;
    }
    super::set_last_observed_eth_height(store, state.last_observed_eth_height);
    for tx in &state.pool {
        super::set_pool_transaction(store, tx)?;
    }
    super::set_last_pool_id(store, state.last_pool_id);
    for b in &state.batches {
        super::set_batch(store, b)?;
        if b.is_pending() {
            super::set_pending_batch(store, &b.denom, b.batch_nonce)?;
        }
    }
    for c in &state.batch_confirms {
        super::set_batch_confirm(store, c)?;
    }
    for a in &state.aborted_batches {
        super::add_aborted_batch(store, a)?;
    }

    info!(
        "[qc-18] Genesis loaded: {} delegations, {} attestations, {} pooled, {} batches",
        state.delegations.len(),
        state.attestations.len(),
        state.pool.len(),
        state.batches.len()
    );
    Ok(())
}

/// Read the module state back out, each collection in key order.
pub fn export_genesis(store: &dyn KvStore) -> PeggyResult<GenesisState> {
    Ok(GenesisState {
        params: super::params(store)?,
        delegations: super::delegations(store)?,
        attestations: super::attestations(store)?,
        claims: super::all_claims(store)?,
        nonce_streams: super::nonce_cursors(store)?,
        validator_event_nonces: super::validator_event_nonces(store)?,
        last_observed_eth_height: super::last_observed_eth_height(store)?,
        pool: super::all_pool_transactions(store)?,
        last_pool_id: super::last_pool_id(store)?,
        batches: super::all_batches(store)?,
        batch_confirms: super::all_batch_confirms(store)?,
        aborted_batches: super::all_aborted_batches(store)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::domain::NonceStream;
    use shared_types::{AccAddress, Coin, EthAddress, ValAddress};

    fn transfer(id: u64) -> OutgoingTransferTx {
        OutgoingTransferTx {
            id,
            sender: AccAddress::new([1; 20]),
            destination: EthAddress::new([2; 20]),
            amount: Coin::new("uumee", 10u64),
            bridge_fee: Coin::new("uumee", 1u64),
        }
    }

    #[test]
    fn test_default_genesis_round_trips() {
        let mut store = MemoryStore::new();
        init_genesis(&mut store, &GenesisState::default()).unwrap();
        assert_eq!(export_genesis(&store).unwrap(), GenesisState::default());
    }

    #[test]
    fn test_pending_index_rebuilt_on_import() {
        let mut state = GenesisState::default();
        state.last_pool_id = 2;
        state.pool.push(transfer(2));
        state.batches.push(OutgoingTxBatch::new("umee-peggy", "uumee", 1, vec![transfer(1)], 5));
        state.nonce_streams.push(NonceCursor {
            stream: NonceStream::Event,
            last: 4,
        });

        let mut store = MemoryStore::new();
        init_genesis(&mut store, &state).unwrap();
        assert_eq!(crate::store::pending_batch_nonce(&store, "uumee").unwrap(), Some(1));

        let exported = export_genesis(&store).unwrap();
        assert_eq!(exported, state);

        let json = exported.to_json().unwrap();
        let mut reimported = MemoryStore::new();
        init_genesis(&mut reimported, &GenesisState::from_json(&json).unwrap()).unwrap();
        assert_eq!(reimported.dump(), store.dump());
    }

    #[test]
    fn test_rejects_pool_id_beyond_counter() {
        let mut state = GenesisState::default();
        state.pool.push(transfer(3));
        state.last_pool_id = 2;
        assert!(matches!(
            init_genesis(&mut MemoryStore::new(), &state),
            Err(PeggyError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_rejects_claim_without_attestation_vote() {
        let event = crate::domain::EthereumEvent {
            event_nonce: 1,
            eth_block_height: 9,
            payload: crate::domain::ClaimPayload::Deposit {
                eth_sender: EthAddress::new([1; 20]),
                token_contract: EthAddress::new([2; 20]),
                receiver: AccAddress::new([3; 20]),
                amount: shared_types::U256::from(5u64),
            },
        };
        let validator = ValAddress::new([4; 20]);
        let claim = Claim::new(AccAddress::new([5; 20]), validator, &event).unwrap();

        let mut state = GenesisState::default();
        state.claims.push(claim.clone());
        assert!(state.validate().is_err());

        let mut attestation = Attestation::new(event, claim.payload_hash, 0);
        attestation.add_vote(validator);
        state.attestations.push(attestation);
        assert!(state.validate().is_ok());

        let mut store = MemoryStore::new();
        init_genesis(&mut store, &state).unwrap();
        assert_eq!(export_genesis(&store).unwrap(), state);
    }

    #[test]
    fn test_rejects_two_pending_batches_per_denom() {
        let mut state = GenesisState::default();
        state.last_pool_id = 2;
        state.batches.push(OutgoingTxBatch::new("p", "uumee", 1, vec![transfer(1)], 0));
        state.batches.push(OutgoingTxBatch::new("p", "uumee", 2, vec![transfer(2)], 0));
        assert!(state.validate().is_err());
    }
}
