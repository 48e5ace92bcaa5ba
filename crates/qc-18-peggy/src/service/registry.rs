//! Orchestrator registry
//!
//! Binds a bonded validator to one orchestrator account and one external
//! address. Each key can serve only one validator at a time.

use super::PeggyService;
use crate::context::Context;
use crate::domain::{verify_delegation_proof, OrchestratorDelegation};
use crate::error::{PeggyError, PeggyResult};
use crate::events::PeggyEvent;
use crate::msgs::MsgDelegateOrchestrator;
use crate::ports::outbound::{AccountKeeper, BankKeeper, ClaimHandler, StakingKeeper};
use crate::store;
use tracing::info;

impl<B, S, A, H> PeggyService<B, S, A, H>
where
    B: BankKeeper,
    S: StakingKeeper,
    A: AccountKeeper,
    H: ClaimHandler,
{
    pub(super) fn delegate(&self, ctx: &mut Context<'_>, msg: &MsgDelegateOrchestrator) -> PeggyResult<()> {
        let validator = msg.validator;
        self.bonded_power(&validator)?;

        let nonce = self.accounts.sequence(&validator.to_account());
        verify_delegation_proof(&validator, nonce, &msg.eth_address, &msg.eth_signature)?;

        if let Some(bound) = store::validator_by_orchestrator(ctx.store, &msg.orchestrator)? {
            if bound != validator {
                return Err(PeggyError::OrchestratorAlreadyBound {
                    orchestrator: msg.orchestrator.to_string(),
                    validator: bound.to_string(),
                });
            }
        }
        if let Some(bound) = store::validator_by_eth_address(ctx.store, &msg.eth_address)? {
            if bound != validator {
                return Err(PeggyError::EthAddressAlreadyBound {
                    eth_address: msg.eth_address.to_string(),
                    validator: bound.to_string(),
                });
            }
        }

        if let Some(previous) = store::delegation(ctx.store, &validator)? {
            store::remove_delegation_indexes(ctx.store, &previous);
            info!(
                "[qc-18] Delegation of {} superseded (was {} / {})",
                validator, previous.orchestrator, previous.eth_address
            );
            ctx.emit(PeggyEvent::DelegationSuperseded {
                validator,
                previous_orchestrator: previous.orchestrator,
                previous_eth_address: previous.eth_address,
            });
        }

        let delegation = OrchestratorDelegation {
            validator,
            orchestrator: msg.orchestrator,
            eth_address: msg.eth_address,
            proof: msg.eth_signature,
            nonce,
            delegated_at: ctx.block_height,
        };
        store::set_delegation(ctx.store, &delegation)?;

        info!(
            "[qc-18] {} delegated to orchestrator {} / {}",
            validator, msg.orchestrator, msg.eth_address
        );
        ctx.emit(PeggyEvent::OrchestratorDelegated {
            validator,
            orchestrator: msg.orchestrator,
            eth_address: msg.eth_address,
        });
        Ok(())
    }
}
