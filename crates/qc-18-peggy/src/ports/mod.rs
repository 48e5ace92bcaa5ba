//! Ports (Hexagonal Architecture)
//!
//! - inbound: message server and query API driven by the host
//! - outbound: storage, bank, staking, accounts and claim side effects

pub mod inbound;
pub mod outbound;

pub use inbound::{MsgResponse, MsgServer, PeggyQuery, TxResult};
pub use outbound::{AccountKeeper, BankKeeper, ClaimHandler, KvStore, StakingKeeper};
