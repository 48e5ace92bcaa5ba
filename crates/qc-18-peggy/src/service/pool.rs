//! Outgoing transfer pool

use super::PeggyService;
use crate::config::PeggyParams;
use crate::context::Context;
use crate::domain::{parse_destination, validate_amount_and_fee, OutgoingTransferTx};
use crate::error::{PeggyError, PeggyResult};
use crate::events::PeggyEvent;
use crate::msgs::MsgSendToExternal;
use crate::ports::outbound::{AccountKeeper, BankKeeper, ClaimHandler, StakingKeeper};
use crate::store;
use shared_types::Coin;
use tracing::debug;

impl<B, S, A, H> PeggyService<B, S, A, H>
where
    B: BankKeeper,
    S: StakingKeeper,
    A: AccountKeeper,
    H: ClaimHandler,
{
    /// Escrow amount + fee from the sender and pool the transfer.
    pub(super) fn enqueue(&self, ctx: &mut Context<'_>, params: &PeggyParams, msg: &MsgSendToExternal) -> PeggyResult<u64> {
        let destination = parse_destination(&msg.eth_dest)?;
        validate_amount_and_fee(&msg.amount, &msg.bridge_fee)?;
        if msg.bridge_fee.amount < params.min_bridge_fee {
            return Err(PeggyError::FeeTooLow {
                fee: msg.bridge_fee.to_string(),
                min: Coin::new(msg.bridge_fee.denom.clone(), params.min_bridge_fee).to_string(),
            });
        }

        let id = store::next_pool_id(ctx.store)?;
        let tx = OutgoingTransferTx {
            id,
            sender: msg.sender,
            destination,
            amount: msg.amount.clone(),
            bridge_fee: msg.bridge_fee.clone(),
        };
        let escrow = Coin::new(tx.denom(), tx.escrowed()?);
        self.bank.send_to_module(ctx.store, &msg.sender, &escrow)?;
        store::set_pool_transaction(ctx.store, &tx)?;

        debug!(
            "[qc-18] Transfer {} queued: {} + fee {} to {}",
            id, tx.amount, tx.bridge_fee, destination
        );
        ctx.emit(PeggyEvent::TransferQueued {
            id,
            sender: tx.sender,
            destination,
            amount: tx.amount,
            bridge_fee: tx.bridge_fee,
        });
        Ok(id)
    }
}
