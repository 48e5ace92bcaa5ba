//! Outgoing batches
//!
//! A batch freezes an ordered list of transfers under a nonce and a content
//! digest. Orchestrators sign the digest; a confirmation for any other digest
//! is stale or tampered and is refused.

use super::transfer::OutgoingTransferTx;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, IfIsHumanReadable};
use shared_crypto::{keccak256_concat, EthSignature};
use shared_types::{AccAddress, EthAddress, Hash, ValAddress, U256};

/// Method tag mixed into the batch digest.
pub const BATCH_METHOD_NAME: &[u8] = b"transactionBatch";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Collecting confirmations.
    Pending,
    /// Reached quorum; read-only from here on.
    Finalized,
}

/// Batch of outgoing transfers for one denom.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingTxBatch {
    pub batch_nonce: u64,
    pub denom: String,
    /// Transfers in selection order.
    pub transactions: Vec<OutgoingTransferTx>,
    #[serde_as(as = "IfIsHumanReadable<Hex>")]
    pub digest: Hash,
    pub created_height: u64,
    pub status: BatchStatus,
    /// Distinct validators that confirmed, in confirmation order.
    pub confirmed: Vec<ValAddress>,
    /// Power at the last tally.
    pub power: u64,
    pub finalized_height: Option<u64>,
    /// Set once the external chain reports the batch as executed.
    pub executed: bool,
}

impl OutgoingTxBatch {
    pub fn new(
        peggy_id: &str,
        denom: &str,
        batch_nonce: u64,
        transactions: Vec<OutgoingTransferTx>,
        created_height: u64,
    ) -> Self {
        let digest = batch_digest(peggy_id, denom, batch_nonce, &transactions);
        Self {
            batch_nonce,
            denom: denom.to_string(),
            transactions,
            digest,
            created_height,
            status: BatchStatus::Pending,
            confirmed: Vec::new(),
            power: 0,
            finalized_height: None,
            executed: false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == BatchStatus::Pending
    }

    /// First height at which the batch may be timed out.
    pub fn expires_at(&self, timeout_blocks: u64) -> u64 {
        self.created_height.saturating_add(timeout_blocks)
    }

    pub fn is_expired(&self, height: u64, timeout_blocks: u64) -> bool {
        height >= self.expires_at(timeout_blocks)
    }

    /// Sum of amounts and fees held in escrow for this batch.
    pub fn escrowed(&self) -> U256 {
        self.transactions.iter().fold(U256::zero(), |acc, tx| {
            acc.saturating_add(tx.amount.amount).saturating_add(tx.bridge_fee.amount)
        })
    }

    /// Recompute power over confirming validators.
    pub fn tally<F>(&mut self, power_of: F) -> u64
    where
        F: Fn(&ValAddress) -> u64,
    {
        self.power = self
            .confirmed
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(power_of(v)));
        self.power
    }
}

fn push_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    buf.extend_from_slice(bytes);
}

fn push_u256(buf: &mut Vec<u8>, value: &U256) {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    buf.extend_from_slice(&word);
}

/// Content digest binding peggy id, denom, nonce and every transfer in order.
pub fn batch_digest(peggy_id: &str, denom: &str, batch_nonce: u64, txs: &[OutgoingTransferTx]) -> Hash {
    let mut body = Vec::with_capacity(txs.len() * 92);
    for tx in txs {
        body.extend_from_slice(&tx.id.to_be_bytes());
        body.extend_from_slice(tx.destination.as_bytes());
        push_u256(&mut body, &tx.amount.amount);
        push_u256(&mut body, &tx.bridge_fee.amount);
    }

    let mut header = Vec::new();
    push_len_prefixed(&mut header, peggy_id.as_bytes());
    push_len_prefixed(&mut header, BATCH_METHOD_NAME);
    push_len_prefixed(&mut header, denom.as_bytes());
    header.extend_from_slice(&batch_nonce.to_be_bytes());
    header.extend_from_slice(&(txs.len() as u32).to_be_bytes());

    keccak256_concat(&[&header, &body])
}

/// One orchestrator's signature over a batch digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfirmation {
    pub denom: String,
    pub batch_nonce: u64,
    pub orchestrator: AccAddress,
    pub validator: ValAddress,
    /// External address the signature recovers to.
    pub eth_signer: EthAddress,
    pub signature: EthSignature,
}

/// Outcome of a successfully processed confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmOutcome {
    /// Counted; quorum not reached yet.
    Pending { power: u64, required: u64 },
    /// Counted and the batch finalized in this transaction.
    Finalized,
    /// Validator already confirmed this batch; nothing changed.
    DuplicateVote,
    /// Batch was already finalized; nothing changed.
    AlreadyFinalized,
}

/// Timed-out batch kept for audit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbortedBatch {
    pub batch: OutgoingTxBatch,
    pub aborted_height: u64,
}
