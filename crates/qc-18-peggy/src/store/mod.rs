//! Typed access to module state
//!
//! The only code that knows the key layout. Services read and write records
//! through these functions and never touch raw keys.

pub mod codec;
pub mod genesis;
pub mod keys;

use crate::config::PeggyParams;
use crate::domain::{
    AbortedBatch, Attestation, BatchConfirmation, Claim, NonceCursor, NonceStream, OrchestratorDelegation,
    OutgoingTransferTx, OutgoingTxBatch,
};
use crate::error::{PeggyError, PeggyResult};
use crate::ports::outbound::KvStore;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::{AccAddress, EthAddress, Hash, ValAddress};

/// Last event nonce a validator claimed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorEventNonce {
    pub validator: ValAddress,
    pub event_nonce: u64,
}

/// Index entry for the single pending batch of a denom.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBatch {
    pub denom: String,
    pub batch_nonce: u64,
}

// ------------------------------------------------------------------ generic

pub fn get<T: DeserializeOwned>(store: &dyn KvStore, key: &[u8]) -> PeggyResult<Option<T>> {
    store.get(key).map(|bytes| codec::decode(&bytes)).transpose()
}

pub fn put<T: Serialize>(store: &mut dyn KvStore, key: Vec<u8>, value: &T) -> PeggyResult<()> {
    store.set(key, codec::encode(value)?);
    Ok(())
}

/// Decode every value under `prefix`, in key order.
pub fn values<T: DeserializeOwned>(store: &dyn KvStore, prefix: &[u8]) -> PeggyResult<Vec<T>> {
    store
        .iter_prefix(prefix)
        .into_iter()
        .map(|(_, bytes)| codec::decode(&bytes))
        .collect()
}

fn get_u64(store: &dyn KvStore, key: &[u8]) -> PeggyResult<u64> {
    store.get(key).map(|b| codec::decode_u64(&b)).transpose().map(|v| v.unwrap_or(0))
}

/// Counters at zero are not stored, so a fresh and a re-imported keyspace match.
fn put_u64(store: &mut dyn KvStore, key: Vec<u8>, value: u64) {
    if value == 0 {
        store.delete(&key);
    } else {
        store.set(key, codec::encode_u64(value));
    }
}

// ------------------------------------------------------------------- params

pub fn params(store: &dyn KvStore) -> PeggyResult<PeggyParams> {
    get(store, &keys::params_key())?
        .ok_or_else(|| PeggyError::Corrupted("module params not initialised".into()))
}

pub fn set_params(store: &mut dyn KvStore, params: &PeggyParams) -> PeggyResult<()> {
    put(store, keys::params_key(), params)
}

// -------------------------------------------------------------- delegations

pub fn delegation(store: &dyn KvStore, validator: &ValAddress) -> PeggyResult<Option<OrchestratorDelegation>> {
    get(store, &keys::delegation_key(validator))
}

/// Write a delegation and both reverse indexes.
pub fn set_delegation(store: &mut dyn KvStore, delegation: &OrchestratorDelegation) -> PeggyResult<()> {
    put(store, keys::delegation_key(&delegation.validator), delegation)?;
    put(
        store,
        keys::orchestrator_index_key(&delegation.orchestrator),
        &delegation.validator,
    )?;
    put(
        store,
        keys::eth_address_index_key(&delegation.eth_address),
        &delegation.validator,
    )
}

pub fn remove_delegation_indexes(store: &mut dyn KvStore, delegation: &OrchestratorDelegation) {
    store.delete(&keys::orchestrator_index_key(&delegation.orchestrator));
    store.delete(&keys::eth_address_index_key(&delegation.eth_address));
}

pub fn validator_by_orchestrator(store: &dyn KvStore, orchestrator: &AccAddress) -> PeggyResult<Option<ValAddress>> {
    get(store, &keys::orchestrator_index_key(orchestrator))
}

pub fn validator_by_eth_address(store: &dyn KvStore, eth_address: &EthAddress) -> PeggyResult<Option<ValAddress>> {
    get(store, &keys::eth_address_index_key(eth_address))
}

pub fn delegations(store: &dyn KvStore) -> PeggyResult<Vec<OrchestratorDelegation>> {
    values(store, &keys::collection(keys::DELEGATION))
}

// ------------------------------------------------------------- attestations

pub fn attestation(store: &dyn KvStore, event_nonce: u64, payload_hash: &Hash) -> PeggyResult<Option<Attestation>> {
    get(store, &keys::attestation_key(event_nonce, payload_hash))
}

/// Attestations of one nonce in arrival order.
pub fn attestations_for_nonce(store: &dyn KvStore, event_nonce: u64) -> PeggyResult<Vec<Attestation>> {
    let mut atts: Vec<Attestation> = values(store, &keys::attestation_nonce_prefix(event_nonce))?;
    atts.sort_by_key(|a| a.arrival);
    Ok(atts)
}

pub fn set_attestation(store: &mut dyn KvStore, attestation: &Attestation) -> PeggyResult<()> {
    put(
        store,
        keys::attestation_key(attestation.event_nonce, &attestation.payload_hash),
        attestation,
    )
}

pub fn delete_attestation(store: &mut dyn KvStore, event_nonce: u64, payload_hash: &Hash) {
    store.delete(&keys::attestation_key(event_nonce, payload_hash));
}

pub fn attestations(store: &dyn KvStore) -> PeggyResult<Vec<Attestation>> {
    values(store, &keys::collection(keys::ATTESTATION))
}

// ------------------------------------------------------------------- claims

/// Record the vote behind an attestation, keyed by the voting validator.
pub fn set_claim(store: &mut dyn KvStore, claim: &Claim) -> PeggyResult<()> {
    put(
        store,
        keys::claim_key(claim.event_nonce, &claim.payload_hash, &claim.validator),
        claim,
    )
}

/// Votes of one attestation, in validator key order.
pub fn claims_for_attestation(store: &dyn KvStore, event_nonce: u64, payload_hash: &Hash) -> PeggyResult<Vec<Claim>> {
    values(store, &keys::claim_prefix(event_nonce, payload_hash))
}

pub fn delete_claims(store: &mut dyn KvStore, event_nonce: u64, payload_hash: &Hash) {
    for (key, _) in store.iter_prefix(&keys::claim_prefix(event_nonce, payload_hash)) {
        store.delete(&key);
    }
}

pub fn all_claims(store: &dyn KvStore) -> PeggyResult<Vec<Claim>> {
    values(store, &keys::collection(keys::CLAIM))
}

// ------------------------------------------------------------------- nonces

pub fn nonce_cursor(store: &dyn KvStore, stream: &NonceStream) -> PeggyResult<NonceCursor> {
    Ok(get(store, &keys::nonce_stream_key(stream))?.unwrap_or_else(|| NonceCursor::new(stream.clone())))
}

pub fn set_nonce_cursor(store: &mut dyn KvStore, cursor: &NonceCursor) -> PeggyResult<()> {
    let key = keys::nonce_stream_key(&cursor.stream);
    if cursor.last == 0 {
        store.delete(&key);
        return Ok(());
    }
    put(store, key, cursor)
}

pub fn nonce_cursors(store: &dyn KvStore) -> PeggyResult<Vec<NonceCursor>> {
    values(store, &keys::collection(keys::NONCE_STREAM))
}

pub fn last_event_nonce_by_validator(store: &dyn KvStore, validator: &ValAddress) -> PeggyResult<u64> {
    let record: Option<ValidatorEventNonce> = get(store, &keys::validator_event_nonce_key(validator))?;
    Ok(record.map_or(0, |r| r.event_nonce))
}

pub fn set_last_event_nonce_by_validator(store: &mut dyn KvStore, record: &ValidatorEventNonce) -> PeggyResult<()> {
    put(store, keys::validator_event_nonce_key(&record.validator), record)
}

pub fn validator_event_nonces(store: &dyn KvStore) -> PeggyResult<Vec<ValidatorEventNonce>> {
    values(store, &keys::collection(keys::VALIDATOR_EVENT_NONCE))
}

pub fn last_observed_eth_height(store: &dyn KvStore) -> PeggyResult<u64> {
    get_u64(store, &keys::last_observed_eth_height_key())
}

pub fn set_last_observed_eth_height(store: &mut dyn KvStore, height: u64) {
    put_u64(store, keys::last_observed_eth_height_key(), height);
}

// --------------------------------------------------------------------- pool

/// Pooled transfers of one denom, in id order.
pub fn pool_transactions(store: &dyn KvStore, denom: &str) -> PeggyResult<Vec<OutgoingTransferTx>> {
    values(store, &keys::pool_denom_prefix(denom))
}

pub fn has_pool_transactions(store: &dyn KvStore, denom: &str) -> bool {
    !store.iter_prefix(&keys::pool_denom_prefix(denom)).is_empty()
}

pub fn set_pool_transaction(store: &mut dyn KvStore, tx: &OutgoingTransferTx) -> PeggyResult<()> {
    put(store, keys::pool_key(tx.denom(), tx.id), tx)
}

pub fn delete_pool_transaction(store: &mut dyn KvStore, denom: &str, id: u64) {
    store.delete(&keys::pool_key(denom, id));
}

pub fn all_pool_transactions(store: &dyn KvStore) -> PeggyResult<Vec<OutgoingTransferTx>> {
    values(store, &keys::collection(keys::POOL))
}

pub fn last_pool_id(store: &dyn KvStore) -> PeggyResult<u64> {
    get_u64(store, &keys::last_pool_id_key())
}

pub fn set_last_pool_id(store: &mut dyn KvStore, id: u64) {
    put_u64(store, keys::last_pool_id_key(), id);
}

/// Allocate the next transfer id.
pub fn next_pool_id(store: &mut dyn KvStore) -> PeggyResult<u64> {
    let id = last_pool_id(store)?
        .checked_add(1)
        .ok_or_else(|| PeggyError::Corrupted("transfer id counter exhausted".into()))?;
    set_last_pool_id(store, id);
    Ok(id)
}

// ------------------------------------------------------------------ batches

pub fn batch(store: &dyn KvStore, denom: &str, batch_nonce: u64) -> PeggyResult<Option<OutgoingTxBatch>> {
    get(store, &keys::batch_key(denom, batch_nonce))
}

pub fn set_batch(store: &mut dyn KvStore, batch: &OutgoingTxBatch) -> PeggyResult<()> {
    put(store, keys::batch_key(&batch.denom, batch.batch_nonce), batch)
}

pub fn delete_batch(store: &mut dyn KvStore, denom: &str, batch_nonce: u64) {
    store.delete(&keys::batch_key(denom, batch_nonce));
}

pub fn all_batches(store: &dyn KvStore) -> PeggyResult<Vec<OutgoingTxBatch>> {
    values(store, &keys::collection(keys::BATCH))
}

pub fn pending_batch_nonce(store: &dyn KvStore, denom: &str) -> PeggyResult<Option<u64>> {
    let entry: Option<PendingBatch> = get(store, &keys::pending_batch_key(denom))?;
    Ok(entry.map(|p| p.batch_nonce))
}

pub fn set_pending_batch(store: &mut dyn KvStore, denom: &str, batch_nonce: u64) -> PeggyResult<()> {
    put(
        store,
        keys::pending_batch_key(denom),
        &PendingBatch {
            denom: denom.to_string(),
            batch_nonce,
        },
    )
}

pub fn clear_pending_batch(store: &mut dyn KvStore, denom: &str) {
    store.delete(&keys::pending_batch_key(denom));
}

/// Every pending batch, in denom key order.
pub fn pending_batches(store: &dyn KvStore) -> PeggyResult<Vec<PendingBatch>> {
    values(store, &keys::collection(keys::PENDING_BATCH))
}

pub fn batch_confirm(
    store: &dyn KvStore,
    denom: &str,
    batch_nonce: u64,
    orchestrator: &AccAddress,
) -> PeggyResult<Option<BatchConfirmation>> {
    get(store, &keys::batch_confirm_key(denom, batch_nonce, orchestrator))
}

pub fn set_batch_confirm(store: &mut dyn KvStore, confirm: &BatchConfirmation) -> PeggyResult<()> {
    put(
        store,
        keys::batch_confirm_key(&confirm.denom, confirm.batch_nonce, &confirm.orchestrator),
        confirm,
    )
}

pub fn batch_confirms(store: &dyn KvStore, denom: &str, batch_nonce: u64) -> PeggyResult<Vec<BatchConfirmation>> {
    values(store, &keys::batch_confirm_prefix(denom, batch_nonce))
}

pub fn delete_batch_confirms(store: &mut dyn KvStore, denom: &str, batch_nonce: u64) {
    for (key, _) in store.iter_prefix(&keys::batch_confirm_prefix(denom, batch_nonce)) {
        store.delete(&key);
    }
}

pub fn all_batch_confirms(store: &dyn KvStore) -> PeggyResult<Vec<BatchConfirmation>> {
    values(store, &keys::collection(keys::BATCH_CONFIRM))
}

pub fn add_aborted_batch(store: &mut dyn KvStore, aborted: &AbortedBatch) -> PeggyResult<()> {
    let b = &aborted.batch;
    put(
        store,
        keys::aborted_batch_key(&b.denom, b.batch_nonce, b.created_height),
        aborted,
    )
}

pub fn aborted_batches(store: &dyn KvStore, denom: &str) -> PeggyResult<Vec<AbortedBatch>> {
    values(store, &keys::aborted_batch_denom_prefix(denom))
}

pub fn all_aborted_batches(store: &dyn KvStore) -> PeggyResult<Vec<AbortedBatch>> {
    values(store, &keys::collection(keys::ABORTED_BATCH))
}
