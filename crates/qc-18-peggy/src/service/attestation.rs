//! Event attestation ledger
//!
//! Claims for the next expected nonce are tallied immediately. Finalizing a
//! nonce marks the winner observed, drops competing payloads, advances the
//! event stream and runs the claim side effect in a nested store.

use super::PeggyService;
use crate::adapters::CacheStore;
use crate::config::PeggyParams;
use crate::context::Context;
use crate::domain::{
    select_winner, Attestation, Claim, ClaimOutcome, EthereumEvent, EvidenceKind, ForkEvidence, NoncePosition,
    NonceStream,
};
use crate::error::{PeggyError, PeggyResult};
use crate::events::PeggyEvent;
use crate::metrics;
use crate::msgs::MsgSubmitClaim;
use crate::ports::outbound::{AccountKeeper, BankKeeper, ClaimHandler, StakingKeeper};
use crate::store::{self, ValidatorEventNonce};
use shared_types::Hash;
use tracing::{debug, error, info};

impl<B, S, A, H> PeggyService<B, S, A, H>
where
    B: BankKeeper,
    S: StakingKeeper,
    A: AccountKeeper,
    H: ClaimHandler,
{
    pub(super) fn submit_claim(
        &self,
        ctx: &mut Context<'_>,
        params: &PeggyParams,
        msg: &MsgSubmitClaim,
    ) -> PeggyResult<ClaimOutcome> {
        let validator = self.resolve_orchestrator(ctx.store, &msg.orchestrator)?;
        let claim = Claim::new(msg.orchestrator, validator, &msg.event)?;
        let nonce = claim.event_nonce;
        let hash = claim.payload_hash;

        let cursor = store::nonce_cursor(ctx.store, &NonceStream::Event)?;
        let position = cursor.classify(nonce, params.future_nonce_policy, params.max_buffered_nonce_gap)?;
        let mut attestations = store::attestations_for_nonce(ctx.store, nonce)?;

        if position == NoncePosition::Past {
            let Some(observed) = attestations.iter().find(|a| a.observed) else {
                return Err(PeggyError::NonceOutOfOrder {
                    nonce,
                    expected: cursor.next_expected(),
                });
            };
            if observed.payload_hash == hash {
                debug!("[qc-18] Late matching claim for nonce {} from {}", nonce, validator);
                return Ok(ClaimOutcome::AlreadyObserved);
            }
            let observed_hash = observed.payload_hash;
            self.record_evidence(ForkEvidence {
                kind: EvidenceKind::ConflictingClaim,
                event_nonce: nonce,
                validator,
                orchestrator: msg.orchestrator,
                recorded_hash: observed_hash,
                submitted_hash: hash,
                block_height: ctx.block_height,
            });
            return Err(PeggyError::ConflictingClaim {
                nonce,
                observed: observed_hash,
                submitted: hash,
            });
        }

        if let Some(prior) = attestations.iter().find(|a| a.has_vote(&validator)) {
            if prior.payload_hash != hash {
                self.record_evidence(ForkEvidence {
                    kind: EvidenceKind::Equivocation,
                    event_nonce: nonce,
                    validator,
                    orchestrator: msg.orchestrator,
                    recorded_hash: prior.payload_hash,
                    submitted_hash: hash,
                    block_height: ctx.block_height,
                });
                ctx.emit(PeggyEvent::Misbehaviour {
                    kind: EvidenceKind::Equivocation,
                    event_nonce: nonce,
                    validator,
                });
            }
            debug!("[qc-18] Duplicate vote for nonce {} from {}", nonce, validator);
            return Ok(ClaimOutcome::DuplicateVote);
        }

        let index = match attestations.iter().position(|a| a.payload_hash == hash) {
            Some(i) => i,
            None => {
                let arrival = attestations.len() as u32;
                attestations.push(Attestation::new(msg.event.clone(), hash, arrival));
                attestations.len() - 1
            }
        };
        let attestation = &mut attestations[index];
        attestation.add_vote(validator);
        attestation.tally(|v| self.power_of(v));
        store::set_attestation(ctx.store, attestation)?;
        store::set_claim(ctx.store, &claim)?;

        let last = store::last_event_nonce_by_validator(ctx.store, &validator)?;
        store::set_last_event_nonce_by_validator(
            ctx.store,
            &ValidatorEventNonce {
                validator,
                event_nonce: last.max(nonce),
            },
        )?;

        debug!(
            "[qc-18] {} claim for nonce {} from {} ({})",
            claim.claim_type,
            nonce,
            validator,
            hex::encode(&hash[..8])
        );
        metrics::record_claim(&claim.claim_type.to_string());
        ctx.emit(PeggyEvent::ClaimSubmitted {
            event_nonce: nonce,
            claim_type: claim.claim_type,
            validator,
            payload_hash: hash,
        });

        if position == NoncePosition::Future {
            return Ok(ClaimOutcome::Buffered);
        }

        match self.finalize_from(ctx, params, nonce)? {
            Some(payload_hash) => Ok(ClaimOutcome::Observed { payload_hash }),
            None => {
                let power = store::attestation(ctx.store, nonce, &hash)?.map_or(0, |a| a.power);
                Ok(ClaimOutcome::Pending {
                    power,
                    required: params.quorum.required_power(self.staking.total_power()),
                })
            }
        }
    }

    /// Retry the next expected event nonce, e.g. after a power change.
    pub(super) fn finalize_ready(&self, ctx: &mut Context<'_>, params: &PeggyParams) -> PeggyResult<()> {
        let cursor = store::nonce_cursor(ctx.store, &NonceStream::Event)?;
        let Some(next) = cursor.last.checked_add(1) else {
            return Ok(());
        };
        self.finalize_from(ctx, params, next)?;
        Ok(())
    }

    /// Finalize `nonce` if it has a winner, then keep going through buffered
    /// nonces. Returns the payload observed at `nonce`.
    fn finalize_from(&self, ctx: &mut Context<'_>, params: &PeggyParams, nonce: u64) -> PeggyResult<Option<Hash>> {
        let first = self.try_finalize(ctx, params, nonce)?;
        if first.is_some() {
            let mut next = nonce.checked_add(1);
            while let Some(n) = next {
                if self.try_finalize(ctx, params, n)?.is_none() {
                    break;
                }
                next = n.checked_add(1);
            }
        }
        Ok(first)
    }

    /// Tally every payload of `nonce` and observe the first to reach quorum.
    fn try_finalize(&self, ctx: &mut Context<'_>, params: &PeggyParams, nonce: u64) -> PeggyResult<Option<Hash>> {
        let mut attestations = store::attestations_for_nonce(ctx.store, nonce)?;
        if attestations.is_empty() {
            return Ok(None);
        }

        let total = self.staking.total_power();
        let Some(winner) = select_winner(&mut attestations, total, &params.quorum, |v| self.power_of(v)) else {
            for a in &attestations {
                store::set_attestation(ctx.store, a)?;
            }
            return Ok(None);
        };

        let mut cursor = store::nonce_cursor(ctx.store, &NonceStream::Event)?;
        cursor.advance(nonce)?;
        store::set_nonce_cursor(ctx.store, &cursor)?;

        let mut observed = attestations.swap_remove(winner);
        for loser in &attestations {
            store::delete_attestation(ctx.store, nonce, &loser.payload_hash);
            store::delete_claims(ctx.store, nonce, &loser.payload_hash);
        }
        observed.observed = true;
        observed.observed_height = Some(ctx.block_height);
        store::set_attestation(ctx.store, &observed)?;

        let last_height = store::last_observed_eth_height(ctx.store)?;
        store::set_last_observed_eth_height(ctx.store, last_height.max(observed.event.eth_block_height));

        info!(
            "[qc-18] Attestation observed: nonce {} with {}/{} power ({} competing payloads dropped)",
            nonce,
            observed.power,
            total,
            attestations.len()
        );
        metrics::record_attestation_observed();
        ctx.emit(PeggyEvent::AttestationObserved {
            event_nonce: nonce,
            claim_type: observed.event.claim_type(),
            payload_hash: observed.payload_hash,
            power: observed.power,
        });

        self.apply_side_effect(ctx, params, &observed.event);
        Ok(Some(observed.payload_hash))
    }

    /// Run the claim handler in a nested store. A failure discards its writes
    /// but leaves the observation in place.
    fn apply_side_effect(&self, ctx: &mut Context<'_>, params: &PeggyParams, event: &EthereumEvent) {
        let block_height = ctx.block_height;
        let mut nested = CacheStore::new(&mut *ctx.store);
        let mut sub = Context::new(block_height, &mut nested);
        let result = self.handler.handle(&mut sub, params, event);
        let events = sub.into_events();
        match result {
            Ok(()) => {
                nested.write();
                ctx.extend_events(events);
            }
            Err(e) => {
                error!("[qc-18] Claim handler failed for nonce {}: {}", event.event_nonce, e);
                metrics::record_claim_handler_failure();
                ctx.emit(PeggyEvent::ClaimHandlerFailed {
                    event_nonce: event.event_nonce,
                    reason: e.to_string(),
                });
            }
        }
    }
}
