//! Module key layout
//!
//! Every key is `peggy/` + one collection tag + big-endian / length-prefixed
//! components, so prefix iteration yields records in nonce and id order.
//!
//! | Tag | Collection | Key suffix | Value |
//! |-----|------------|------------|-------|
//! | 0x01 | params | - | `PeggyParams` |
//! | 0x02 | delegations | validator | `OrchestratorDelegation` |
//! | 0x03 | orchestrator index | orchestrator | `ValAddress` |
//! | 0x04 | external address index | eth address | `ValAddress` |
//! | 0x05 | attestations | nonce, payload hash | `Attestation` |
//! | 0x06 | last claimed nonce | validator | `ValidatorEventNonce` |
//! | 0x07 | nonce streams | stream | `NonceCursor` |
//! | 0x08 | pool | denom, id | `OutgoingTransferTx` |
//! | 0x09 | last pool id | - | u64 |
//! | 0x0A | batches | denom, nonce | `OutgoingTxBatch` |
//! | 0x0B | confirmations | denom, nonce, orchestrator | `BatchConfirmation` |
//! | 0x0C | pending batch | denom | `PendingBatch` |
//! | 0x0D | aborted batches | denom, nonce, created height | `AbortedBatch` |
//! | 0x0E | last observed external height | - | u64 |
//! | 0x0F | claims | nonce, payload hash, validator | `Claim` |

use crate::domain::NonceStream;
use shared_types::{AccAddress, EthAddress, Hash, ValAddress};

/// Namespace shared by every key of the module.
pub const MODULE_PREFIX: &[u8] = b"peggy/";

pub const PARAMS: u8 = 0x01;
pub const DELEGATION: u8 = 0x02;
pub const ORCHESTRATOR_INDEX: u8 = 0x03;
pub const ETH_ADDRESS_INDEX: u8 = 0x04;
pub const ATTESTATION: u8 = 0x05;
pub const VALIDATOR_EVENT_NONCE: u8 = 0x06;
pub const NONCE_STREAM: u8 = 0x07;
pub const POOL: u8 = 0x08;
pub const LAST_POOL_ID: u8 = 0x09;
pub const BATCH: u8 = 0x0A;
pub const BATCH_CONFIRM: u8 = 0x0B;
pub const PENDING_BATCH: u8 = 0x0C;
pub const ABORTED_BATCH: u8 = 0x0D;
pub const LAST_OBSERVED_ETH_HEIGHT: u8 = 0x0E;
pub const CLAIM: u8 = 0x0F;

/// Prefix of one collection.
pub fn collection(tag: u8) -> Vec<u8> {
    let mut key = Vec::with_capacity(MODULE_PREFIX.len() + 64);
    key.extend_from_slice(MODULE_PREFIX);
    key.push(tag);
    key
}

fn push_str(key: &mut Vec<u8>, s: &str) {
    key.extend_from_slice(&(s.len() as u16).to_be_bytes());
    key.extend_from_slice(s.as_bytes());
}

pub fn params_key() -> Vec<u8> {
    collection(PARAMS)
}

pub fn delegation_key(validator: &ValAddress) -> Vec<u8> {
    let mut key = collection(DELEGATION);
    key.extend_from_slice(validator.as_bytes());
    key
}

pub fn orchestrator_index_key(orchestrator: &AccAddress) -> Vec<u8> {
    let mut key = collection(ORCHESTRATOR_INDEX);
    key.extend_from_slice(orchestrator.as_bytes());
    key
}

pub fn eth_address_index_key(eth_address: &EthAddress) -> Vec<u8> {
    let mut key = collection(ETH_ADDRESS_INDEX);
    key.extend_from_slice(eth_address.as_bytes());
    key
}

pub fn attestation_nonce_prefix(event_nonce: u64) -> Vec<u8> {
    let mut key = collection(ATTESTATION);
    key.extend_from_slice(&event_nonce.to_be_bytes());
    key
}

pub fn attestation_key(event_nonce: u64, payload_hash: &Hash) -> Vec<u8> {
    let mut key = attestation_nonce_prefix(event_nonce);
    key.extend_from_slice(payload_hash);
    key
}

pub fn claim_prefix(event_nonce: u64, payload_hash: &Hash) -> Vec<u8> {
    let mut key = collection(CLAIM);
    key.extend_from_slice(&event_nonce.to_be_bytes());
    key.extend_from_slice(payload_hash);
    key
}

pub fn claim_key(event_nonce: u64, payload_hash: &Hash, validator: &ValAddress) -> Vec<u8> {
    let mut key = claim_prefix(event_nonce, payload_hash);
    key.extend_from_slice(validator.as_bytes());
    key
}

pub fn validator_event_nonce_key(validator: &ValAddress) -> Vec<u8> {
    let mut key = collection(VALIDATOR_EVENT_NONCE);
    key.extend_from_slice(validator.as_bytes());
    key
}

pub fn nonce_stream_key(stream: &NonceStream) -> Vec<u8> {
    let mut key = collection(NONCE_STREAM);
    match stream {
        NonceStream::Event => key.push(0x00),
        NonceStream::Batch(denom) => {
            key.push(0x01);
            push_str(&mut key, denom);
        }
    }
    key
}

pub fn pool_denom_prefix(denom: &str) -> Vec<u8> {
    let mut key = collection(POOL);
    push_str(&mut key, denom);
    key
}

pub fn pool_key(denom: &str, id: u64) -> Vec<u8> {
    let mut key = pool_denom_prefix(denom);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

pub fn last_pool_id_key() -> Vec<u8> {
    collection(LAST_POOL_ID)
}

pub fn batch_denom_prefix(denom: &str) -> Vec<u8> {
    let mut key = collection(BATCH);
    push_str(&mut key, denom);
    key
}

pub fn batch_key(denom: &str, batch_nonce: u64) -> Vec<u8> {
    let mut key = batch_denom_prefix(denom);
    key.extend_from_slice(&batch_nonce.to_be_bytes());
    key
}

pub fn batch_confirm_prefix(denom: &str, batch_nonce: u64) -> Vec<u8> {
    let mut key = collection(BATCH_CONFIRM);
    push_str(&mut key, denom);
    key.extend_from_slice(&batch_nonce.to_be_bytes());
    key
}

pub fn batch_confirm_key(denom: &str, batch_nonce: u64, orchestrator: &AccAddress) -> Vec<u8> {
    let mut key = batch_confirm_prefix(denom, batch_nonce);
    key.extend_from_slice(orchestrator.as_bytes());
    key
}

pub fn pending_batch_key(denom: &str) -> Vec<u8> {
    let mut key = collection(PENDING_BATCH);
    push_str(&mut key, denom);
    key
}

pub fn aborted_batch_denom_prefix(denom: &str) -> Vec<u8> {
    let mut key = collection(ABORTED_BATCH);
    push_str(&mut key, denom);
    key
}

pub fn aborted_batch_key(denom: &str, batch_nonce: u64, created_height: u64) -> Vec<u8> {
    let mut key = aborted_batch_denom_prefix(denom);
    key.extend_from_slice(&batch_nonce.to_be_bytes());
    key.extend_from_slice(&created_height.to_be_bytes());
    key
}

pub fn last_observed_eth_height_key() -> Vec<u8> {
    collection(LAST_OBSERVED_ETH_HEIGHT)
}
