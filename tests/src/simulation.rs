//! Seeded random chain driver
//!
//! Drives the bridge module the way a host chain would: user transfers,
//! batch requests, orchestrator claims and confirmations, and validator
//! power changes, with an `end_block` after every block. The external
//! chain is an append-only event log that orchestrators replay in order.
//! Validator 0 is byzantine and sometimes reports a tampered payload.
//!
//! Everything random comes from one `StdRng` seeded by the config, so two
//! runs with the same seed must leave byte-identical state.

use std::collections::BTreeSet;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qc_18_peggy::adapters::{
    module_address, BankClaimHandler, InMemoryAccounts, InMemoryStaking, MemoryStore, StoreBank,
};
use qc_18_peggy::domain::{sign_delegation, voucher_denom, ClaimPayload};
use qc_18_peggy::store::{self, keys::MODULE_PREFIX};
use qc_18_peggy::{
    init_genesis, BankKeeper, EthereumEvent, GenesisState, KvStore, MsgConfirmBatch,
    MsgDelegateOrchestrator, MsgRequestBatch, MsgSendToExternal, MsgServer, MsgSubmitClaim,
    NonceStream, PeggyEvent, PeggyMsg, PeggyParams, PeggyQuery, PeggyService, StakingKeeper,
    TxResult,
};
use shared_crypto::EthSigningKey;
use shared_types::{AccAddress, Coin, EthAddress, ValAddress, U256};

pub type SimService =
    PeggyService<StoreBank, InMemoryStaking, InMemoryAccounts, BankClaimHandler<StoreBank>>;

pub const NATIVE_DENOM: &str = "uumee";
/// ERC20 representing the native denom on the external chain.
pub const NATIVE_CONTRACT: EthAddress = EthAddress::new([0xaa; 20]);
/// External token bridged in as a voucher.
pub const VOUCHER_CONTRACT: EthAddress = EthAddress::new([0xee; 20]);

const BYZANTINE: usize = 0;
const BYZANTINE_POWER: u64 = 5;
const USER_FUNDS: u64 = 1_000_000;

#[derive(Clone, Debug)]
pub struct SimConfig {
    pub seed: u64,
    pub blocks: u64,
    pub validators: usize,
    pub users: usize,
    pub ops_per_block: usize,
    pub params: PeggyParams,
}

impl SimConfig {
    /// Defaults; `PEGGY_SIM_BLOCKS` overrides the block count.
    pub fn new(seed: u64) -> Self {
        let blocks = std::env::var("PEGGY_SIM_BLOCKS")
            .ok()
            .and_then(|b| b.parse().ok())
            .unwrap_or(200);
        Self {
            seed,
            blocks,
            validators: 5,
            users: 8,
            ops_per_block: 12,
            params: sim_params(),
        }
    }
}

/// Short batch timeout so timeouts actually happen during a run.
pub fn sim_params() -> PeggyParams {
    let mut params = PeggyParams {
        max_batch_size: 8,
        batch_timeout_blocks: 15,
        ..PeggyParams::default()
    };
    params
        .erc20_to_denom
        .insert(NATIVE_CONTRACT, NATIVE_DENOM.to_string());
    params
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    pub delivered: u64,
    pub rejected: u64,
    pub observed: u64,
    pub batches_created: u64,
    pub batches_finalized: u64,
    pub batches_timed_out: u64,
    pub batches_executed: u64,
    pub handler_failures: u64,
    pub misbehaviour: u64,
}

#[derive(Clone)]
pub struct SimValidator {
    pub validator: ValAddress,
    pub orchestrator: AccAddress,
    pub eth_key: EthSigningKey,
    /// Index of the next external event this orchestrator reports.
    cursor: usize,
}

pub struct SimChain {
    pub service: SimService,
    pub staking: Arc<InMemoryStaking>,
    pub store: MemoryStore,
    pub validators: Vec<SimValidator>,
    pub users: Vec<AccAddress>,
    pub height: u64,
    pub stats: SimStats,
    config: SimConfig,
    rng: StdRng,
    external_events: Vec<EthereumEvent>,
    reported_batches: BTreeSet<u64>,
    eth_height: u64,
    last_observed: u64,
}

pub fn new_service(staking: Arc<InMemoryStaking>) -> SimService {
    let bank = Arc::new(StoreBank::new());
    PeggyService::new(
        bank.clone(),
        staking,
        Arc::new(InMemoryAccounts::new()),
        Arc::new(BankClaimHandler::new(bank)),
    )
}

fn random_key(rng: &mut StdRng) -> EthSigningKey {
    loop {
        let secret: [u8; 32] = rng.gen();
        if let Ok(key) = EthSigningKey::from_bytes(&secret) {
            return key;
        }
    }
}

impl SimChain {
    pub fn new(config: SimConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let staking = Arc::new(InMemoryStaking::new());
        let service = new_service(staking.clone());

        let mut store = MemoryStore::new();
        let genesis = GenesisState {
            params: config.params.clone(),
            ..GenesisState::default()
        };
        init_genesis(&mut store, &genesis).expect("genesis params are valid");

        let validators: Vec<SimValidator> = (0..config.validators)
            .map(|i| {
                let validator = ValAddress::new([i as u8 + 1; 20]);
                let power = if i == BYZANTINE {
                    BYZANTINE_POWER
                } else {
                    rng.gen_range(20..=60)
                };
                staking.set_power(validator, power);
                SimValidator {
                    validator,
                    orchestrator: AccAddress::new([0x80 + i as u8; 20]),
                    eth_key: random_key(&mut rng),
                    cursor: 0,
                }
            })
            .collect();

        let users: Vec<AccAddress> = (0..config.users)
            .map(|i| AccAddress::new([0x20 + i as u8; 20]))
            .collect();
        for user in &users {
            service
                .bank()
                .fund(&mut store, user, &Coin::new(NATIVE_DENOM, USER_FUNDS))
                .expect("funding");
        }

        let mut chain = Self {
            service,
            staking,
            store,
            validators,
            users,
            height: 1,
            stats: SimStats::default(),
            config,
            rng,
            external_events: Vec::new(),
            reported_batches: BTreeSet::new(),
            eth_height: 100,
            last_observed: 0,
        };
        for index in 0..chain.validators.len() {
            chain.delegate(index);
        }
        chain
    }

    /// Same chain at the same RNG position, running on `store` with fresh
    /// adapters. Used to continue a run after a genesis re-import.
    pub fn restart_with(&self, store: MemoryStore) -> Self {
        let staking = Arc::new(InMemoryStaking::with_powers(
            self.staking
                .validators()
                .into_iter()
                .filter_map(|v| self.staking.validator_power(&v).map(|p| (v, p))),
        ));
        Self {
            service: new_service(staking.clone()),
            staking,
            store,
            validators: self.validators.clone(),
            users: self.users.clone(),
            height: self.height,
            stats: self.stats.clone(),
            config: self.config.clone(),
            rng: self.rng.clone(),
            external_events: self.external_events.clone(),
            reported_batches: self.reported_batches.clone(),
            eth_height: self.eth_height,
            last_observed: self.last_observed,
        }
    }

    pub fn run(&mut self) {
        for _ in 0..self.config.blocks {
            self.step_block();
        }
    }

    pub fn run_blocks(&mut self, blocks: u64) {
        for _ in 0..blocks {
            self.step_block();
        }
    }

    pub fn step_block(&mut self) {
        for _ in 0..self.config.ops_per_block {
            match self.rng.gen_range(0..100) {
                0..=24 => self.send_to_eth(),
                25..=31 => self.request_batch(),
                32..=51 => self.confirm_batch(),
                52..=61 => self.external_deposit(),
                62..=66 => self.external_execution(),
                67..=95 => self.claim(),
                _ => self.change_power(),
            }
        }
        let events = self
            .service
            .end_block(&mut self.store, self.height)
            .expect("end_block");
        self.tally(&events);
        self.check_invariants();
        self.height += 1;
    }

    /// Module keyspace only; bank entries are excluded.
    pub fn module_state(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.store.iter_prefix(MODULE_PREFIX)
    }

    pub fn external_event_count(&self) -> usize {
        self.external_events.len()
    }

    fn deliver(&mut self, msg: PeggyMsg) -> Option<TxResult> {
        match self.service.deliver(&mut self.store, self.height, &msg) {
            Ok(result) => {
                self.stats.delivered += 1;
                self.tally(&result.events);
                Some(result)
            }
            Err(_) => {
                self.stats.rejected += 1;
                None
            }
        }
    }

    fn tally(&mut self, events: &[PeggyEvent]) {
        for event in events {
            match event {
                PeggyEvent::AttestationObserved { .. } => self.stats.observed += 1,
                PeggyEvent::BatchCreated { .. } => self.stats.batches_created += 1,
                PeggyEvent::BatchFinalized { .. } => self.stats.batches_finalized += 1,
                PeggyEvent::BatchTimedOut { .. } => self.stats.batches_timed_out += 1,
                PeggyEvent::BatchExecuted { .. } => self.stats.batches_executed += 1,
                PeggyEvent::ClaimHandlerFailed { .. } => self.stats.handler_failures += 1,
                PeggyEvent::Misbehaviour { .. } => self.stats.misbehaviour += 1,
                _ => {}
            }
        }
    }

    fn delegate(&mut self, index: usize) {
        let v = &self.validators[index];
        let eth_signature = sign_delegation(&v.eth_key, &v.validator, 0).expect("signing");
        let msg = PeggyMsg::DelegateOrchestrator(MsgDelegateOrchestrator {
            validator: v.validator,
            orchestrator: v.orchestrator,
            eth_address: v.eth_key.address(),
            eth_signature,
        });
        assert!(self.deliver(msg).is_some(), "delegation of validator {index} failed");
    }

    fn random_user(&mut self) -> AccAddress {
        let index = self.rng.gen_range(0..self.users.len());
        self.users[index]
    }

    fn send_to_eth(&mut self) {
        let sender = self.random_user();
        let destination = EthAddress::new(self.rng.gen());
        let amount = self.rng.gen_range(1..=5_000u64);
        let fee = self.rng.gen_range(1..=50u64);
        self.deliver(PeggyMsg::SendToExternal(MsgSendToExternal {
            sender,
            eth_dest: destination.to_string(),
            amount: Coin::new(NATIVE_DENOM, amount),
            bridge_fee: Coin::new(NATIVE_DENOM, fee),
        }));
    }

    fn request_batch(&mut self) {
        let sender = self.random_user();
        self.deliver(PeggyMsg::RequestBatch(MsgRequestBatch {
            sender,
            denom: NATIVE_DENOM.to_string(),
        }));
    }

    fn confirm_batch(&mut self) {
        let Ok(Some(batch)) = self.service.pending_batch(&self.store, NATIVE_DENOM) else {
            return;
        };
        let index = self.rng.gen_range(0..self.validators.len());
        let v = &self.validators[index];
        let signature = v.eth_key.sign_personal(&batch.digest).expect("signing");
        let msg = PeggyMsg::ConfirmBatch(MsgConfirmBatch {
            orchestrator: v.orchestrator,
            denom: batch.denom,
            batch_nonce: batch.batch_nonce,
            signed_digest: batch.digest,
            signature,
        });
        self.deliver(msg);
    }

    fn push_event(&mut self, payload: ClaimPayload) {
        self.external_events.push(EthereumEvent {
            event_nonce: self.external_events.len() as u64 + 1,
            eth_block_height: self.eth_height,
            payload,
        });
    }

    fn external_deposit(&mut self) {
        self.eth_height += self.rng.gen_range(1..=3);
        let receiver = self.random_user();
        let amount = U256::from(self.rng.gen_range(1..=10_000u64));
        self.push_event(ClaimPayload::Deposit {
            eth_sender: EthAddress::new([0x11; 20]),
            token_contract: VOUCHER_CONTRACT,
            receiver,
            amount,
        });
    }

    /// The bridge contract executes the oldest finalized batch not yet reported.
    fn external_execution(&mut self) {
        let Ok(batches) = store::all_batches(&self.store) else {
            return;
        };
        let Some(batch) = batches
            .into_iter()
            .find(|b| !b.is_pending() && !b.executed && !self.reported_batches.contains(&b.batch_nonce))
        else {
            return;
        };
        self.reported_batches.insert(batch.batch_nonce);
        self.eth_height += 1;
        self.push_event(ClaimPayload::WithdrawBatch {
            batch_nonce: batch.batch_nonce,
            token_contract: NATIVE_CONTRACT,
            denom: batch.denom,
        });
    }

    fn claim(&mut self) {
        let index = self.rng.gen_range(0..self.validators.len());
        let Some(mut event) = self.external_events.get(self.validators[index].cursor).cloned() else {
            return;
        };
        if index == BYZANTINE && self.rng.gen_bool(0.3) {
            tamper(&mut event);
        }
        let orchestrator = self.validators[index].orchestrator;
        if self
            .deliver(PeggyMsg::SubmitClaim(MsgSubmitClaim { orchestrator, event }))
            .is_some()
        {
            self.validators[index].cursor += 1;
        }
    }

    /// Honest validators only, so the honest set always holds a quorum.
    fn change_power(&mut self) {
        let index = self.rng.gen_range(0..self.validators.len());
        if index == BYZANTINE {
            return;
        }
        let power = self.rng.gen_range(20..=60);
        self.staking.set_power(self.validators[index].validator, power);
    }

    pub fn check_invariants(&mut self) {
        let height = self.height;

        let observed = self
            .service
            .last_observed_event_nonce(&self.store)
            .expect("query");
        assert!(
            observed >= self.last_observed,
            "observed nonce went back from {} to {} at height {height}",
            self.last_observed,
            observed
        );
        assert!(
            observed as usize <= self.external_events.len(),
            "observed nonce {observed} was never emitted externally"
        );
        self.last_observed = observed;

        let batches = store::all_batches(&self.store).expect("batches");
        let pooled = store::all_pool_transactions(&self.store)
            .expect("pool")
            .iter()
            .filter(|tx| tx.denom() == NATIVE_DENOM)
            .map(|tx| tx.escrowed().expect("escrow fits"))
            .fold(U256::zero(), |acc, e| acc + e);
        let batched = batches
            .iter()
            .filter(|b| b.denom == NATIVE_DENOM)
            .map(|b| b.escrowed())
            .fold(U256::zero(), |acc, e| acc + e);
        let module = self
            .service
            .bank()
            .balance(&self.store, &module_address(), NATIVE_DENOM)
            .expect("balance");
        assert_eq!(module, pooled + batched, "escrow out of balance at height {height}");

        let pending = batches.iter().filter(|b| b.is_pending()).count();
        assert!(pending <= 1, "{pending} pending batches at height {height}");

        let finalized = batches.iter().filter(|b| !b.is_pending()).count() as u64;
        let next_batch = self
            .service
            .next_expected(&self.store, &NonceStream::Batch(NATIVE_DENOM.to_string()))
            .expect("query");
        assert_eq!(next_batch, finalized + 1, "batch nonces not gap-free at height {height}");

        let minted = self.external_events[..observed as usize]
            .iter()
            .filter_map(|e| match &e.payload {
                ClaimPayload::Deposit { amount, .. } => Some(*amount),
                ClaimPayload::WithdrawBatch { .. } => None,
            })
            .fold(U256::zero(), |acc, a| acc + a);
        let supply = self
            .service
            .bank()
            .supply(&self.store, &voucher_denom(&VOUCHER_CONTRACT))
            .expect("supply");
        assert_eq!(supply, minted, "voucher supply differs from observed deposits");
    }
}

fn tamper(event: &mut EthereumEvent) {
    match &mut event.payload {
        ClaimPayload::Deposit { amount, .. } => *amount = *amount + U256::one(),
        ClaimPayload::WithdrawBatch { batch_nonce, .. } => *batch_nonce += 1,
    }
}

/// Run a fresh chain for `config.blocks` blocks.
pub fn simulate(config: SimConfig) -> SimChain {
    let mut chain = SimChain::new(config);
    chain.run();
    chain
}
