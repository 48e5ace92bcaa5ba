//! Peggy service: message handling on top of the outbound ports
//!
//! Every entry point runs in a fresh [`CacheStore`] over the host store and
//! flushes it only when the handler succeeds.

pub(crate) mod attestation;
pub(crate) mod batch;
mod pool;
mod query;
mod registry;

use crate::adapters::CacheStore;
use crate::context::Context;
use crate::domain::{EvidenceKind, ForkEvidence};
use crate::error::{PeggyError, PeggyResult};
use crate::events::PeggyEvent;
use crate::metrics;
use crate::msgs::PeggyMsg;
use crate::ports::inbound::{MsgResponse, MsgServer, TxResult};
use crate::ports::outbound::{AccountKeeper, BankKeeper, ClaimHandler, KvStore, StakingKeeper};
use crate::store;
use parking_lot::RwLock;
use shared_types::{AccAddress, ValAddress};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Fork evidence kept in memory; older entries are dropped first.
pub const MAX_FORK_EVIDENCE: usize = 1_024;

/// The Peggy bridge module.
///
/// Holds no consensus state: everything lives in the store handed to each
/// call. The only local state is the bounded fork-evidence log.
pub struct PeggyService<B, S, A, H>
where
    B: BankKeeper,
    S: StakingKeeper,
    A: AccountKeeper,
    H: ClaimHandler,
{
    bank: Arc<B>,
    staking: Arc<S>,
    accounts: Arc<A>,
    handler: Arc<H>,
    evidence: RwLock<VecDeque<ForkEvidence>>,
}

impl<B, S, A, H> PeggyService<B, S, A, H>
where
    B: BankKeeper,
    S: StakingKeeper,
    A: AccountKeeper,
    H: ClaimHandler,
{
    pub fn new(bank: Arc<B>, staking: Arc<S>, accounts: Arc<A>, handler: Arc<H>) -> Self {
        Self {
            bank,
            staking,
            accounts,
            handler,
            evidence: RwLock::new(VecDeque::with_capacity(MAX_FORK_EVIDENCE)),
        }
    }

    pub fn bank(&self) -> &Arc<B> {
        &self.bank
    }

    pub fn staking(&self) -> &Arc<S> {
        &self.staking
    }

    /// Time out one expired pending batch, returning the ids put back in the pool.
    pub fn timeout_batch(
        &self,
        store: &mut dyn KvStore,
        block_height: u64,
        denom: &str,
        batch_nonce: u64,
    ) -> PeggyResult<(Vec<u64>, Vec<PeggyEvent>)> {
        self.execute(store, block_height, "timeout_batch", |ctx| {
            let params = store::params(ctx.store)?;
            self.timeout(ctx, &params, denom, batch_nonce)
        })
    }

    /// Run `f` against a write buffer and flush it only on success.
    fn execute<T, F>(&self, store: &mut dyn KvStore, block_height: u64, label: &str, f: F) -> PeggyResult<(T, Vec<PeggyEvent>)>
    where
        F: FnOnce(&mut Context<'_>) -> PeggyResult<T>,
    {
        let mut cache = CacheStore::new(store);
        let mut ctx = Context::new(block_height, &mut cache);
        let result = f(&mut ctx);
        let events = ctx.into_events();
        match result {
            Ok(value) => {
                cache.write();
                Ok((value, events))
            }
            Err(e) => {
                debug!("[qc-18] {} rejected at height {}: {}", label, block_height, e);
                metrics::record_message_rejected(e.reason());
                Err(e)
            }
        }
    }

    fn dispatch(&self, ctx: &mut Context<'_>, msg: &PeggyMsg) -> PeggyResult<MsgResponse> {
        msg.validate_basic()?;
        let params = store::params(ctx.store)?;
        match msg {
            PeggyMsg::DelegateOrchestrator(m) => self.delegate(ctx, m).map(|()| MsgResponse::Delegated),
            PeggyMsg::SubmitClaim(m) => self.submit_claim(ctx, &params, m).map(MsgResponse::Claim),
            PeggyMsg::SendToExternal(m) => self
                .enqueue(ctx, &params, m)
                .map(|tx_id| MsgResponse::Queued { tx_id }),
            PeggyMsg::RequestBatch(m) => self
                .create_batch(ctx, &params, &m.denom)
                .map(|b| MsgResponse::BatchCreated {
                    batch_nonce: b.batch_nonce,
                    tx_count: b.transactions.len(),
                }),
            PeggyMsg::ConfirmBatch(m) => self.confirm_batch(ctx, &params, m).map(MsgResponse::Confirm),
        }
    }

    /// Current power of a bonded validator, 0 otherwise.
    fn power_of(&self, validator: &ValAddress) -> u64 {
        self.staking.validator_power(validator).unwrap_or(0)
    }

    /// Power of a validator that must be bonded with non-zero power.
    fn bonded_power(&self, validator: &ValAddress) -> PeggyResult<u64> {
        match self.staking.validator_power(validator) {
            Some(power) if power > 0 => Ok(power),
            _ => Err(PeggyError::UnknownValidator(validator.to_string())),
        }
    }

    /// Validator an orchestrator acts for; it must still be bonded.
    fn resolve_orchestrator(&self, store: &dyn KvStore, orchestrator: &AccAddress) -> PeggyResult<ValAddress> {
        let validator = store::validator_by_orchestrator(store, orchestrator)?
            .ok_or_else(|| PeggyError::NotDelegated(orchestrator.to_string()))?;
        self.bonded_power(&validator)?;
        Ok(validator)
    }

    fn record_evidence(&self, evidence: ForkEvidence) {
        let kind = match evidence.kind {
            EvidenceKind::ConflictingClaim => "conflicting_claim",
            EvidenceKind::Equivocation => "equivocation",
        };
        warn!(
            "[qc-18] Fork evidence ({}) at nonce {} from {}",
            kind, evidence.event_nonce, evidence.validator
        );
        metrics::record_fork_evidence(kind);
        let mut log = self.evidence.write();
        if log.len() == MAX_FORK_EVIDENCE {
            log.pop_front();
        }
        log.push_back(evidence);
    }
}

impl<B, S, A, H> MsgServer for PeggyService<B, S, A, H>
where
    B: BankKeeper,
    S: StakingKeeper,
    A: AccountKeeper,
    H: ClaimHandler,
{
    fn deliver(&self, store: &mut dyn KvStore, block_height: u64, msg: &PeggyMsg) -> PeggyResult<TxResult> {
        let (response, events) = self.execute(store, block_height, msg.name(), |ctx| self.dispatch(ctx, msg))?;
        Ok(TxResult { response, events })
    }

    fn end_block(&self, store: &mut dyn KvStore, block_height: u64) -> PeggyResult<Vec<PeggyEvent>> {
        let ((), events) = self.execute(store, block_height, "end_block", |ctx| {
            let params = store::params(ctx.store)?;
            self.expire_batches(ctx, &params)?;
            self.finalize_ready(ctx, &params)
        })?;
        Ok(events)
    }
}
