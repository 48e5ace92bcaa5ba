//! Batch builder
//!
//! At most one pending batch per denom. A batch takes its nonce from the
//! denom's batch stream (last finalized + 1); the stream only advances when
//! a batch finalizes, so a timed-out batch's nonce is reused by the next one.

use super::PeggyService;
use crate::config::PeggyParams;
use crate::context::Context;
use crate::domain::{
    select_by_priority, AbortedBatch, BatchConfirmation, BatchStatus, ConfirmOutcome, NonceStream,
    OutgoingTxBatch,
};
use crate::error::{PeggyError, PeggyResult};
use crate::events::PeggyEvent;
use crate::metrics;
use crate::msgs::MsgConfirmBatch;
use crate::ports::outbound::{AccountKeeper, BankKeeper, ClaimHandler, KvStore, StakingKeeper};
use crate::store;
use shared_crypto::verify_personal_signer;
use tracing::{debug, info};

/// Mark `batch` finalized at `height`: advance its denom's batch stream,
/// clear the pending index and persist it.
pub(crate) fn seal_batch(store: &mut dyn KvStore, batch: &mut OutgoingTxBatch, height: u64) -> PeggyResult<()> {
    let stream = NonceStream::Batch(batch.denom.clone());
    let mut cursor = store::nonce_cursor(store, &stream)?;
    cursor.advance(batch.batch_nonce)?;
    store::set_nonce_cursor(store, &cursor)?;

    batch.status = BatchStatus::Finalized;
    batch.finalized_height = Some(height);
    store::clear_pending_batch(store, &batch.denom);
    store::set_batch(store, batch)?;
    metrics::record_batch_finalized();
    Ok(())
}

fn unknown_batch(denom: &str, batch_nonce: u64) -> PeggyError {
    PeggyError::UnknownBatch {
        denom: denom.to_string(),
        batch_nonce,
    }
}

impl<B, S, A, H> PeggyService<B, S, A, H>
where
    B: BankKeeper,
    S: StakingKeeper,
    A: AccountKeeper,
    H: ClaimHandler,
{
    pub(super) fn create_batch(
        &self,
        ctx: &mut Context<'_>,
        params: &PeggyParams,
        denom: &str,
    ) -> PeggyResult<OutgoingTxBatch> {
        if !store::has_pool_transactions(ctx.store, denom) {
            return Err(PeggyError::EmptyPool {
                denom: denom.to_string(),
            });
        }
        if let Some(batch_nonce) = store::pending_batch_nonce(ctx.store, denom)? {
            return Err(PeggyError::BatchAlreadyPending {
                denom: denom.to_string(),
                batch_nonce,
            });
        }

        let pooled = store::pool_transactions(ctx.store, denom)?;
        let selected = select_by_priority(pooled, params.max_batch_size as usize);
        for tx in &selected {
            store::delete_pool_transaction(ctx.store, denom, tx.id);
        }

        let batch_nonce = store::nonce_cursor(ctx.store, &NonceStream::Batch(denom.to_string()))?.next_expected();
        let batch = OutgoingTxBatch::new(&params.peggy_id, denom, batch_nonce, selected, ctx.block_height);
        store::set_batch(ctx.store, &batch)?;
        store::set_pending_batch(ctx.store, denom, batch_nonce)?;

        info!(
            "[qc-18] Batch {}/{} created with {} transfers (digest {})",
            denom,
            batch_nonce,
            batch.transactions.len(),
            hex::encode(&batch.digest[..8])
        );
        metrics::record_batch_created();
        ctx.emit(PeggyEvent::BatchCreated {
            denom: denom.to_string(),
            batch_nonce,
            tx_count: batch.transactions.len(),
            digest: batch.digest,
        });
        Ok(batch)
    }

    pub(super) fn confirm_batch(
        &self,
        ctx: &mut Context<'_>,
        params: &PeggyParams,
        msg: &MsgConfirmBatch,
    ) -> PeggyResult<ConfirmOutcome> {
        let validator = self.resolve_orchestrator(ctx.store, &msg.orchestrator)?;
        let delegation =
            store::delegation(ctx.store, &validator)?.ok_or_else(|| PeggyError::NotDelegated(validator.to_string()))?;
        let mut batch =
            store::batch(ctx.store, &msg.denom, msg.batch_nonce)?.ok_or_else(|| unknown_batch(&msg.denom, msg.batch_nonce))?;

        if msg.signed_digest != batch.digest {
            return Err(PeggyError::DigestMismatch {
                stored: batch.digest,
                signed: msg.signed_digest,
            });
        }
        verify_personal_signer(&batch.digest, &msg.signature, &delegation.eth_address)?;

        if !batch.is_pending() {
            return Ok(ConfirmOutcome::AlreadyFinalized);
        }
        if batch.confirmed.contains(&validator) {
            debug!("[qc-18] Duplicate confirmation of {}/{} from {}", msg.denom, msg.batch_nonce, validator);
            return Ok(ConfirmOutcome::DuplicateVote);
        }

        store::set_batch_confirm(
            ctx.store,
            &BatchConfirmation {
                denom: msg.denom.clone(),
                batch_nonce: msg.batch_nonce,
                orchestrator: msg.orchestrator,
                validator,
                eth_signer: delegation.eth_address,
                signature: msg.signature,
            },
        )?;
        batch.confirmed.push(validator);
        ctx.emit(PeggyEvent::BatchConfirmed {
            denom: msg.denom.clone(),
            batch_nonce: msg.batch_nonce,
            validator,
        });

        let power = batch.tally(|v| self.power_of(v));
        let required = params.quorum.required_power(self.staking.total_power());
        if power < required {
            store::set_batch(ctx.store, &batch)?;
            debug!(
                "[qc-18] Batch {}/{} confirmed by {} ({}/{})",
                msg.denom, msg.batch_nonce, validator, power, required
            );
            return Ok(ConfirmOutcome::Pending { power, required });
        }

        seal_batch(ctx.store, &mut batch, ctx.block_height)?;
        info!(
            "[qc-18] Batch {}/{} finalized with {}/{} power",
            msg.denom, msg.batch_nonce, power, required
        );
        ctx.emit(PeggyEvent::BatchFinalized {
            denom: msg.denom.clone(),
            batch_nonce: msg.batch_nonce,
            power,
        });
        Ok(ConfirmOutcome::Finalized)
    }

    /// Return an expired pending batch's transfers to the pool and archive it.
    pub(super) fn timeout(
        &self,
        ctx: &mut Context<'_>,
        params: &PeggyParams,
        denom: &str,
        batch_nonce: u64,
    ) -> PeggyResult<Vec<u64>> {
        let batch = store::batch(ctx.store, denom, batch_nonce)?.ok_or_else(|| unknown_batch(denom, batch_nonce))?;
        if !batch.is_pending() {
            return Err(PeggyError::BatchAlreadyFinalized {
                denom: denom.to_string(),
                batch_nonce,
            });
        }
        if !batch.is_expired(ctx.block_height, params.batch_timeout_blocks) {
            return Err(PeggyError::BatchNotExpired {
                denom: denom.to_string(),
                batch_nonce,
                expires_at: batch.expires_at(params.batch_timeout_blocks),
            });
        }

        for tx in &batch.transactions {
            store::set_pool_transaction(ctx.store, tx)?;
        }
        store::delete_batch_confirms(ctx.store, denom, batch_nonce);
        store::delete_batch(ctx.store, denom, batch_nonce);
        store::clear_pending_batch(ctx.store, denom);

        let returned: Vec<u64> = batch.transactions.iter().map(|tx| tx.id).collect();
        store::add_aborted_batch(
            ctx.store,
            &AbortedBatch {
                batch,
                aborted_height: ctx.block_height,
            },
        )?;

        info!(
            "[qc-18] Batch {}/{} timed out, {} transfers returned to the pool",
            denom,
            batch_nonce,
            returned.len()
        );
        metrics::record_batch_timed_out();
        ctx.emit(PeggyEvent::BatchTimedOut {
            denom: denom.to_string(),
            batch_nonce,
            returned: returned.clone(),
        });
        Ok(returned)
    }

    /// Time out every pending batch that has expired at the current height.
    pub(super) fn expire_batches(&self, ctx: &mut Context<'_>, params: &PeggyParams) -> PeggyResult<()> {
        for pending in store::pending_batches(ctx.store)? {
            let Some(batch) = store::batch(ctx.store, &pending.denom, pending.batch_nonce)? else {
                continue;
            };
            if batch.is_expired(ctx.block_height, params.batch_timeout_blocks) {
                self.timeout(ctx, params, &pending.denom, pending.batch_nonce)?;
            }
        }
        Ok(())
    }
}
