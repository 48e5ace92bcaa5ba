//! Outgoing transfers (chain to external chain)

use crate::error::{PeggyError, PeggyResult};
use serde::{Deserialize, Serialize};
use shared_types::{AccAddress, Coin, EthAddress, U256};
use std::cmp::Ordering;

/// A transfer waiting in the pool or carried by a batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingTransferTx {
    /// Pool id, assigned in insertion order starting at 1.
    pub id: u64,
    pub sender: AccAddress,
    pub destination: EthAddress,
    pub amount: Coin,
    pub bridge_fee: Coin,
}

impl OutgoingTransferTx {
    pub fn denom(&self) -> &str {
        &self.amount.denom
    }

    /// Amount plus fee: the sum escrowed from the sender.
    pub fn escrowed(&self) -> PeggyResult<U256> {
        self.amount
            .amount
            .checked_add(self.bridge_fee.amount)
            .ok_or_else(|| PeggyError::InvalidAmount("amount plus fee overflows".into()))
    }

    pub fn priority(&self) -> TransferPriority {
        TransferPriority {
            fee: self.bridge_fee.amount,
            id: self.id,
        }
    }
}

/// Parse and check an external destination: `0x` + 40 hex digits, not zero.
pub fn parse_destination(destination: &str) -> PeggyResult<EthAddress> {
    let address: EthAddress = destination
        .parse()
        .map_err(|e| PeggyError::InvalidDestination(format!("{destination}: {e}")))?;
    if address.is_zero() {
        return Err(PeggyError::InvalidDestination("zero address".into()));
    }
    Ok(address)
}

/// Prefix of denoms minted for tokens that originate on the external chain.
pub const VOUCHER_DENOM_PREFIX: &str = "peggy";

/// Chain-side denom of an external token contract: `peggy0x<contract-hex>`.
pub fn voucher_denom(contract: &EthAddress) -> String {
    format!("{VOUCHER_DENOM_PREFIX}{contract}")
}

/// Stateless checks on an amount/fee pair.
pub fn validate_amount_and_fee(amount: &Coin, fee: &Coin) -> PeggyResult<()> {
    amount.validate()?;
    if amount.denom != fee.denom {
        return Err(PeggyError::DenomMismatch {
            amount: amount.denom.clone(),
            fee: fee.denom.clone(),
        });
    }
    if amount.is_zero() {
        return Err(PeggyError::InvalidAmount("transfer amount is zero".into()));
    }
    if amount.amount.checked_add(fee.amount).is_none() {
        return Err(PeggyError::InvalidAmount("amount plus fee overflows".into()));
    }
    Ok(())
}

/// Batch selection order: higher fee first, then lower pool id (older).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferPriority {
    pub fee: U256,
    pub id: u64,
}

impl Ord for TransferPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher fee sorts first
        other
            .fee
            .cmp(&self.fee)
            // Earlier insertion for equal fees
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for TransferPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort `txs` in selection order and keep at most `max`.
pub fn select_by_priority(mut txs: Vec<OutgoingTransferTx>, max: usize) -> Vec<OutgoingTransferTx> {
    txs.sort_by_key(OutgoingTransferTx::priority);
    txs.truncate(max);
    txs
}
