//! Orchestrator delegation
//!
//! A validator delegates two keys: a chain account (the orchestrator) that
//! submits claims and confirmations, and an external-chain address whose
//! signatures end up on the bridge contract. The external key must prove
//! custody by signing [`SetOrchestratorAddressesSignMsg`].

use crate::error::{PeggyError, PeggyResult};
use crate::store::codec;
use serde::{Deserialize, Serialize};
use shared_crypto::{keccak256, verify_personal_signer, EthSignature, EthSigningKey};
use shared_types::{AccAddress, EthAddress, Hash, ValAddress};

/// Live delegation of a validator. At most one per validator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorDelegation {
    pub validator: ValAddress,
    pub orchestrator: AccAddress,
    pub eth_address: EthAddress,
    /// EIP-191 signature by `eth_address` over the binding message.
    pub proof: EthSignature,
    /// Account sequence the proof is bound to.
    pub nonce: u64,
    /// Block height at which the delegation was written.
    pub delegated_at: u64,
}

/// Message the external key signs to prove custody.
///
/// Binding the validator and its current account sequence keeps a proof
/// from being replayed for another validator or at a later sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOrchestratorAddressesSignMsg {
    pub validator_address: ValAddress,
    pub nonce: u64,
}

impl SetOrchestratorAddressesSignMsg {
    pub fn new(validator_address: ValAddress, nonce: u64) -> Self {
        Self {
            validator_address,
            nonce,
        }
    }

    /// keccak256 of the bincode encoding; this is the hash that gets
    /// wrapped in the personal-message envelope and signed.
    pub fn sign_hash(&self) -> PeggyResult<Hash> {
        Ok(keccak256(&codec::encode(self)?))
    }
}

/// Produce a delegation proof with `key` for `validator` at `nonce`.
pub fn sign_delegation(key: &EthSigningKey, validator: &ValAddress, nonce: u64) -> PeggyResult<EthSignature> {
    let hash = SetOrchestratorAddressesSignMsg::new(*validator, nonce).sign_hash()?;
    Ok(key.sign_personal(&hash)?)
}

/// Check that `proof` was made by `eth_address` for `validator` at `nonce`.
pub fn verify_delegation_proof(
    validator: &ValAddress,
    nonce: u64,
    eth_address: &EthAddress,
    proof: &EthSignature,
) -> PeggyResult<()> {
    let hash = SetOrchestratorAddressesSignMsg::new(*validator, nonce).sign_hash()?;
    verify_personal_signer(&hash, proof, eth_address).map_err(|e| PeggyError::InvalidProof {
        validator: validator.to_string(),
        reason: e.to_string(),
    })
}
