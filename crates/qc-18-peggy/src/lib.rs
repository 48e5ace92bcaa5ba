//! # qc-18-peggy
//!
//! Peggy bridge module: moves fungible assets between this chain and an
//! external smart-contract chain under the joint custody of the bonded
//! validator set.
//!
//! ## Overview
//!
//! - **Delegation**: each validator binds one orchestrator account and one
//!   external signing address, proven by a personal-sign signature
//! - **Attestation**: orchestrators report external events as claims; a claim
//!   payload is observed once its voters hold a quorum of current power
//! - **Gap-free nonces**: events apply strictly in nonce order, batches
//!   use their own per-denom stream
//! - **Outgoing pool**: escrowed transfers are batched by fee priority,
//!   signed by the external keys and sealed on quorum
//!
//! ## Architecture
//!
//! ```text
//!   host ──PeggyMsg──→ MsgServer ──→ PeggyService ──→ KvStore (CacheStore per tx)
//!                                        │
//!                                        ├── StakingKeeper  (voting power)
//!                                        ├── AccountKeeper  (sequence for proofs)
//!                                        ├── BankKeeper     (escrow, mint, burn)
//!                                        └── ClaimHandler   (observed side effects)
//! ```
//!
//! Every entry point is atomic: writes go to a cache over the host store and
//! are flushed only when the handler returns `Ok`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use qc_18_peggy::{MsgServer, PeggyService};
//! use qc_18_peggy::adapters::{BankClaimHandler, InMemoryAccounts, InMemoryStaking, MemoryStore, StoreBank};
//!
//! let bank = Arc::new(StoreBank::new());
//! let service = PeggyService::new(
//!     bank.clone(),
//!     Arc::new(InMemoryStaking::with_powers(powers)),
//!     Arc::new(InMemoryAccounts::new()),
//!     Arc::new(BankClaimHandler::new(bank)),
//! );
//!
//! let result = service.deliver(&mut store, height, &msg)?;
//! let events = service.end_block(&mut store, height)?;
//! ```

pub mod adapters;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod msgs;
pub mod ports;
pub mod service;
pub mod store;

pub use config::{FutureNoncePolicy, PeggyParams, Threshold};
pub use domain::{
    AbortedBatch, Attestation, BatchConfirmation, BatchStatus, Claim, ClaimOutcome, ClaimType,
    ConfirmOutcome, EthereumEvent, ForkEvidence, NonceStream, OrchestratorDelegation,
    OutgoingTransferTx, OutgoingTxBatch,
};
pub use error::{ErrorKind, PeggyError, PeggyResult};
pub use events::PeggyEvent;
pub use msgs::{
    MsgConfirmBatch, MsgDelegateOrchestrator, MsgRequestBatch, MsgSendToExternal, MsgSubmitClaim,
    PeggyMsg,
};
pub use ports::inbound::{MsgResponse, MsgServer, PeggyQuery, TxResult};
pub use ports::outbound::{AccountKeeper, BankKeeper, ClaimHandler, KvStore, StakingKeeper};
pub use service::PeggyService;
pub use store::genesis::{export_genesis, init_genesis, GenesisState};
