//! Default side effects of observed attestations
//!
//! - Deposit of a mapped ERC20: unlock the native coins held in escrow.
//! - Deposit of any other token: mint its voucher denom to the receiver.
//! - Executed batch: burn the escrowed vouchers; native coins stay locked.

use crate::config::PeggyParams;
use crate::context::Context;
use crate::domain::{voucher_denom, ClaimPayload, EthereumEvent};
use crate::error::{PeggyError, PeggyResult};
use crate::events::PeggyEvent;
use crate::ports::outbound::{BankKeeper, ClaimHandler};
use crate::service::batch::seal_batch;
use crate::store;
use shared_types::{AccAddress, Coin, EthAddress, U256};
use std::sync::Arc;
use tracing::info;

pub struct BankClaimHandler<B> {
    bank: Arc<B>,
}

impl<B: BankKeeper> BankClaimHandler<B> {
    pub fn new(bank: Arc<B>) -> Self {
        Self { bank }
    }

    fn deposit(
        &self,
        ctx: &mut Context<'_>,
        params: &PeggyParams,
        token_contract: &EthAddress,
        receiver: &AccAddress,
        amount: U256,
    ) -> PeggyResult<()> {
        if let Some(denom) = params.native_denom(token_contract) {
            let coin = Coin::new(denom, amount);
            self.bank.send_from_module(ctx.store, receiver, &coin)?;
            info!("[qc-18] Unlocked {} to {}", coin, receiver);
            ctx.emit(PeggyEvent::DepositUnlocked {
                receiver: *receiver,
                coin,
            });
        } else {
            let coin = Coin::new(voucher_denom(token_contract), amount);
            self.bank.mint(ctx.store, &coin)?;
            self.bank.send_from_module(ctx.store, receiver, &coin)?;
            info!("[qc-18] Minted {} to {}", coin, receiver);
            ctx.emit(PeggyEvent::DepositMinted {
                receiver: *receiver,
                coin,
            });
        }
        Ok(())
    }

    fn withdraw_batch(
        &self,
        ctx: &mut Context<'_>,
        params: &PeggyParams,
        batch_nonce: u64,
        token_contract: &EthAddress,
        denom: &str,
    ) -> PeggyResult<()> {
        let native = params.contract_for_denom(denom);
        let expected = native.map_or_else(|| voucher_denom(token_contract) == denom, |c| c == *token_contract);
        if !expected {
            return Err(PeggyError::InvalidClaim(format!(
                "token contract {token_contract} does not back {denom}"
            )));
        }

        let mut batch = store::batch(ctx.store, denom, batch_nonce)?.ok_or_else(|| PeggyError::UnknownBatch {
            denom: denom.to_string(),
            batch_nonce,
        })?;
        if batch.executed {
            return Err(PeggyError::BatchAlreadyExecuted {
                denom: denom.to_string(),
                batch_nonce,
            });
        }
        // Executed externally before reaching quorum here.
        if batch.is_pending() {
            seal_batch(ctx.store, &mut batch, ctx.block_height)?;
            ctx.emit(PeggyEvent::BatchFinalized {
                denom: denom.to_string(),
                batch_nonce,
                power: batch.power,
            });
        }

        let burned = if native.is_none() {
            let coin = Coin::new(denom, batch.escrowed());
            self.bank.burn(ctx.store, &coin)?;
            coin
        } else {
            Coin::zero(denom)
        };

        batch.executed = true;
        store::set_batch(ctx.store, &batch)?;
        info!("[qc-18] Batch {}/{} executed, burned {}", denom, batch_nonce, burned);
        ctx.emit(PeggyEvent::BatchExecuted {
            denom: denom.to_string(),
            batch_nonce,
            burned,
        });
        Ok(())
    }
}

impl<B: BankKeeper> ClaimHandler for BankClaimHandler<B> {
    fn handle(&self, ctx: &mut Context<'_>, params: &PeggyParams, event: &EthereumEvent) -> PeggyResult<()> {
        match &event.payload {
            ClaimPayload::Deposit {
                token_contract,
                receiver,
                amount,
                ..
            } => self.deposit(ctx, params, token_contract, receiver, *amount),
            ClaimPayload::WithdrawBatch {
                batch_nonce,
                token_contract,
                denom,
            } => self.withdraw_batch(ctx, params, *batch_nonce, token_contract, denom),
        }
    }
}
