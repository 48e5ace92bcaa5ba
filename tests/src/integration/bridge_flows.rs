//! # Bridge Flows
//!
//! Full round trips through the public API:
//!
//! 1. **Voucher round trip**: external deposit mints a voucher, the user
//!    sends it back, the batch is confirmed and executed, escrow is burned
//! 2. **Native round trip**: escrowed native coins survive a batch timeout,
//!    are re-batched under the same nonce, and a later deposit unlocks them
//! 3. **Atomicity**: a rejected message leaves the store untouched

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::simulation::{new_service, sim_params, SimService, NATIVE_CONTRACT, NATIVE_DENOM, VOUCHER_CONTRACT};
    use qc_18_peggy::adapters::{module_address, InMemoryStaking, MemoryStore};
    use qc_18_peggy::domain::{sign_delegation, voucher_denom, ClaimPayload, EvidenceKind};
    use qc_18_peggy::{
        init_genesis, BankKeeper, BatchStatus, ClaimOutcome, ConfirmOutcome, EthereumEvent,
        GenesisState, MsgConfirmBatch, MsgDelegateOrchestrator, MsgRequestBatch, MsgResponse,
        MsgSendToExternal, MsgServer, MsgSubmitClaim, NonceStream, OutgoingTxBatch, PeggyError,
        PeggyEvent, PeggyMsg, PeggyParams, PeggyQuery, TxResult,
    };
    use shared_crypto::EthSigningKey;
    use shared_types::{AccAddress, Coin, EthAddress, ValAddress, U256};

    const DEST: &str = "0x3333333333333333333333333333333333333333";

    struct Orchestrator {
        validator: ValAddress,
        orchestrator: AccAddress,
        key: EthSigningKey,
    }

    struct Bridge {
        service: SimService,
        store: MemoryStore,
        orchestrators: Vec<Orchestrator>,
        height: u64,
        next_event: u64,
    }

    fn user() -> AccAddress {
        AccAddress::new([0x55; 20])
    }

    impl Bridge {
        fn new(params: PeggyParams) -> Self {
            let powers = [40u64, 30, 30];
            let staking = Arc::new(InMemoryStaking::with_powers(
                powers.iter().enumerate().map(|(i, p)| (ValAddress::new([i as u8 + 1; 20]), *p)),
            ));
            let mut store = MemoryStore::new();
            init_genesis(
                &mut store,
                &GenesisState {
                    params,
                    ..GenesisState::default()
                },
            )
            .unwrap();

            let mut bridge = Self {
                service: new_service(staking),
                store,
                orchestrators: Vec::new(),
                height: 1,
                next_event: 1,
            };
            for i in 0..powers.len() {
                let o = Orchestrator {
                    validator: ValAddress::new([i as u8 + 1; 20]),
                    orchestrator: AccAddress::new([0x90 + i as u8; 20]),
                    key: EthSigningKey::random(),
                };
                let msg = PeggyMsg::DelegateOrchestrator(MsgDelegateOrchestrator {
                    validator: o.validator,
                    orchestrator: o.orchestrator,
                    eth_address: o.key.address(),
                    eth_signature: sign_delegation(&o.key, &o.validator, 0).unwrap(),
                });
                bridge.deliver(msg).unwrap();
                bridge.orchestrators.push(o);
            }
            bridge
        }

        fn deliver(&mut self, msg: PeggyMsg) -> Result<TxResult, PeggyError> {
            self.service.deliver(&mut self.store, self.height, &msg)
        }

        fn balance(&self, address: &AccAddress, denom: &str) -> U256 {
            self.service.bank().balance(&self.store, address, denom).unwrap()
        }

        /// Every orchestrator reports the next external event.
        fn observe(&mut self, payload: ClaimPayload) -> Vec<PeggyEvent> {
            let event = EthereumEvent {
                event_nonce: self.next_event,
                eth_block_height: 500 + self.next_event,
                payload,
            };
            self.next_event += 1;

            let mut events = Vec::new();
            for i in 0..self.orchestrators.len() {
                let orchestrator = self.orchestrators[i].orchestrator;
                let result = self
                    .deliver(PeggyMsg::SubmitClaim(MsgSubmitClaim {
                        orchestrator,
                        event: event.clone(),
                    }))
                    .unwrap();
                events.extend(result.events);
            }
            events
        }

        fn send(&mut self, amount: Coin, fee: Coin) -> u64 {
            let result = self
                .deliver(PeggyMsg::SendToExternal(MsgSendToExternal {
                    sender: user(),
                    eth_dest: DEST.into(),
                    amount,
                    bridge_fee: fee,
                }))
                .unwrap();
            match result.response {
                MsgResponse::Queued { tx_id } => tx_id,
                other => panic!("unexpected response {other:?}"),
            }
        }

        fn request_batch(&mut self, denom: &str) -> OutgoingTxBatch {
            self.deliver(PeggyMsg::RequestBatch(MsgRequestBatch {
                sender: user(),
                denom: denom.into(),
            }))
            .unwrap();
            self.service.pending_batch(&self.store, denom).unwrap().unwrap()
        }

        fn confirm(&mut self, index: usize, batch: &OutgoingTxBatch) -> Result<ConfirmOutcome, PeggyError> {
            let o = &self.orchestrators[index];
            let msg = PeggyMsg::ConfirmBatch(MsgConfirmBatch {
                orchestrator: o.orchestrator,
                denom: batch.denom.clone(),
                batch_nonce: batch.batch_nonce,
                signed_digest: batch.digest,
                signature: o.key.sign_personal(&batch.digest).unwrap(),
            });
            match self.deliver(msg)?.response {
                MsgResponse::Confirm(outcome) => Ok(outcome),
                other => panic!("unexpected response {other:?}"),
            }
        }
    }

    #[test]
    fn test_voucher_round_trip_burns_escrow() {
        let mut bridge = Bridge::new(PeggyParams::default());
        let denom = voucher_denom(&VOUCHER_CONTRACT);

        let events = bridge.observe(ClaimPayload::Deposit {
            eth_sender: EthAddress::new([0x11; 20]),
            token_contract: VOUCHER_CONTRACT,
            receiver: user(),
            amount: U256::from(1_000u64),
        });
        assert!(events.iter().any(|e| matches!(e, PeggyEvent::DepositMinted { .. })));
        assert_eq!(bridge.balance(&user(), &denom), U256::from(1_000u64));

        bridge.send(Coin::new(denom.clone(), 600u64), Coin::new(denom.clone(), 10u64));
        assert_eq!(bridge.balance(&module_address(), &denom), U256::from(610u64));

        let batch = bridge.request_batch(&denom);
        assert_eq!(batch.batch_nonce, 1);
        assert_eq!(bridge.confirm(0, &batch).unwrap(), ConfirmOutcome::Pending { power: 40, required: 67 });
        assert_eq!(bridge.confirm(1, &batch).unwrap(), ConfirmOutcome::Finalized);

        let events = bridge.observe(ClaimPayload::WithdrawBatch {
            batch_nonce: 1,
            token_contract: VOUCHER_CONTRACT,
            denom: denom.clone(),
        });
        assert!(events
            .iter()
            .any(|e| matches!(e, PeggyEvent::BatchExecuted { burned, .. } if burned.amount == U256::from(610u64))));

        let bank = bridge.service.bank().clone();
        assert_eq!(bank.supply(&bridge.store, &denom).unwrap(), U256::from(390u64));
        assert_eq!(bridge.balance(&module_address(), &denom), U256::zero());
        assert!(bridge.service.batch(&bridge.store, &denom, 1).unwrap().unwrap().executed);

        assert_eq!(bridge.service.last_observed_event_nonce(&bridge.store).unwrap(), 2);
        assert_eq!(bridge.service.last_observed_eth_height(&bridge.store).unwrap(), 502);
        let v = bridge.orchestrators[0].validator;
        assert_eq!(bridge.service.last_event_nonce_by_validator(&bridge.store, &v).unwrap(), 2);
    }

    #[test]
    fn test_native_escrow_survives_timeout_and_unlocks() {
        let params = PeggyParams {
            batch_timeout_blocks: 5,
            ..sim_params()
        };
        let mut bridge = Bridge::new(params);
        bridge
            .service
            .bank()
            .fund(&mut bridge.store, &user(), &Coin::new(NATIVE_DENOM, 1_000u64))
            .unwrap();

        let id = bridge.send(Coin::new(NATIVE_DENOM, 500u64), Coin::new(NATIVE_DENOM, 5u64));
        let first = bridge.request_batch(NATIVE_DENOM);
        bridge.confirm(0, &first).unwrap();

        bridge.height += 5;
        let events = bridge.service.end_block(&mut bridge.store, bridge.height).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, PeggyEvent::BatchTimedOut { returned, .. } if returned == &vec![id])));
        assert_eq!(bridge.service.aborted_batches(&bridge.store, NATIVE_DENOM).unwrap().len(), 1);
        assert_eq!(bridge.balance(&module_address(), NATIVE_DENOM), U256::from(505u64));

        // The stale confirmation no longer matches anything.
        assert!(matches!(bridge.confirm(1, &first), Err(PeggyError::UnknownBatch { .. })));

        let second = bridge.request_batch(NATIVE_DENOM);
        assert_eq!(second.batch_nonce, first.batch_nonce);
        bridge.confirm(1, &second).unwrap();
        assert_eq!(bridge.confirm(2, &second).unwrap(), ConfirmOutcome::Finalized);
        let stored = bridge.service.batch(&bridge.store, NATIVE_DENOM, 1).unwrap().unwrap();
        assert_eq!(stored.status, BatchStatus::Finalized);
        assert_eq!(
            bridge
                .service
                .next_expected(&bridge.store, &NonceStream::Batch(NATIVE_DENOM.into()))
                .unwrap(),
            2
        );

        // Native coins stay locked on execution and come back on deposit.
        bridge.observe(ClaimPayload::WithdrawBatch {
            batch_nonce: 1,
            token_contract: NATIVE_CONTRACT,
            denom: NATIVE_DENOM.into(),
        });
        assert_eq!(bridge.balance(&module_address(), NATIVE_DENOM), U256::from(505u64));

        let receiver = AccAddress::new([0x66; 20]);
        let events = bridge.observe(ClaimPayload::Deposit {
            eth_sender: EthAddress::new([0x11; 20]),
            token_contract: NATIVE_CONTRACT,
            receiver,
            amount: U256::from(200u64),
        });
        assert!(events.iter().any(|e| matches!(e, PeggyEvent::DepositUnlocked { .. })));
        assert_eq!(bridge.balance(&receiver, NATIVE_DENOM), U256::from(200u64));
        assert_eq!(bridge.balance(&module_address(), NATIVE_DENOM), U256::from(305u64));
    }

    #[test]
    fn test_rejected_messages_leave_state_untouched() {
        let mut bridge = Bridge::new(sim_params());
        bridge
            .service
            .bank()
            .fund(&mut bridge.store, &user(), &Coin::new(NATIVE_DENOM, 1_000u64))
            .unwrap();
        bridge.send(Coin::new(NATIVE_DENOM, 100u64), Coin::new(NATIVE_DENOM, 1u64));
        let batch = bridge.request_batch(NATIVE_DENOM);
        let before = bridge.store.clone();

        // Tampered digest.
        let o = &bridge.orchestrators[0];
        let mut digest = batch.digest;
        digest[0] ^= 1;
        let tampered = PeggyMsg::ConfirmBatch(MsgConfirmBatch {
            orchestrator: o.orchestrator,
            denom: batch.denom.clone(),
            batch_nonce: batch.batch_nonce,
            signed_digest: digest,
            signature: o.key.sign_personal(&digest).unwrap(),
        });
        assert!(matches!(bridge.deliver(tampered), Err(PeggyError::DigestMismatch { .. })));

        // Overdraft.
        let overdraft = PeggyMsg::SendToExternal(MsgSendToExternal {
            sender: user(),
            eth_dest: DEST.into(),
            amount: Coin::new(NATIVE_DENOM, 5_000u64),
            bridge_fee: Coin::new(NATIVE_DENOM, 1u64),
        });
        assert!(matches!(bridge.deliver(overdraft), Err(PeggyError::InsufficientFunds { .. })));

        // Second pending batch for the denom.
        let again = PeggyMsg::RequestBatch(MsgRequestBatch {
            sender: user(),
            denom: NATIVE_DENOM.into(),
        });
        assert!(bridge.deliver(again).is_err());

        assert_eq!(bridge.store, before);
    }

    #[test]
    fn test_conflicting_late_claim_surfaces_as_evidence() {
        let mut bridge = Bridge::new(PeggyParams::default());
        let honest = ClaimPayload::Deposit {
            eth_sender: EthAddress::new([0x11; 20]),
            token_contract: VOUCHER_CONTRACT,
            receiver: user(),
            amount: U256::from(10u64),
        };
        bridge.observe(honest);

        let forged = EthereumEvent {
            event_nonce: 1,
            eth_block_height: 501,
            payload: ClaimPayload::Deposit {
                eth_sender: EthAddress::new([0x11; 20]),
                token_contract: VOUCHER_CONTRACT,
                receiver: user(),
                amount: U256::from(10_000u64),
            },
        };
        let orchestrator = bridge.orchestrators[2].orchestrator;
        let err = bridge
            .deliver(PeggyMsg::SubmitClaim(MsgSubmitClaim {
                orchestrator,
                event: forged,
            }))
            .unwrap_err();
        assert!(matches!(err, PeggyError::ConflictingClaim { .. }));

        let evidence = bridge.service.fork_evidence();
        assert_eq!(evidence.len(), 1);
        assert_eq!(evidence[0].kind, EvidenceKind::ConflictingClaim);
        assert_eq!(evidence[0].validator, bridge.orchestrators[2].validator);

        // The observed payload is untouched and matching claims stay no-ops.
        let attestations = bridge.service.attestations_for_nonce(&bridge.store, 1).unwrap();
        assert_eq!(attestations.len(), 1);
        assert!(attestations[0].observed);
        let replay = bridge
            .deliver(PeggyMsg::SubmitClaim(MsgSubmitClaim {
                orchestrator,
                event: attestations[0].event.clone(),
            }))
            .unwrap();
        assert_eq!(replay.response, MsgResponse::Claim(ClaimOutcome::AlreadyObserved));
    }
}
