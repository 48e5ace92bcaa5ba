//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports, used by tests, the
//! simulation suite and the CLI, plus the default claim side effects.

mod bank;
mod claim_handler;
mod staking;
mod store;

pub use bank::{module_address, StoreBank, MODULE_NAME};
pub use claim_handler::BankClaimHandler;
pub use staking::{InMemoryAccounts, InMemoryStaking};
pub use store::{CacheStore, MemoryStore};
