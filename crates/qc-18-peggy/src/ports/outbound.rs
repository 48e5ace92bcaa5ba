//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Everything the module needs from the host chain: committed storage,
//! balances, voting power, account sequences, and the side effect applied
//! when an attestation is observed.

use crate::config::PeggyParams;
use crate::context::Context;
use crate::domain::EthereumEvent;
use crate::error::PeggyResult;
use shared_types::{AccAddress, Coin, ValAddress, U256};

/// Ordered byte map with prefix iteration.
///
/// Hosts hand the module a store per transaction; writes become visible to
/// later transactions only after the transaction succeeds.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>);

    fn delete(&mut self, key: &[u8]);

    /// All entries whose key starts with `prefix`, in ascending key order.
    fn iter_prefix(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;

    fn has(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }
}

/// Balance service.
///
/// Balances live in the same transactional store as module state, so a
/// rejected transaction rolls back its debits and credits too.
pub trait BankKeeper: Send + Sync {
    fn balance(&self, store: &dyn KvStore, address: &AccAddress, denom: &str) -> PeggyResult<U256>;

    /// Move `coin` from `from` into the module account.
    fn send_to_module(&self, store: &mut dyn KvStore, from: &AccAddress, coin: &Coin) -> PeggyResult<()>;

    /// Move `coin` from the module account to `to`.
    fn send_from_module(&self, store: &mut dyn KvStore, to: &AccAddress, coin: &Coin) -> PeggyResult<()>;

    /// Create `coin` in the module account.
    fn mint(&self, store: &mut dyn KvStore, coin: &Coin) -> PeggyResult<()>;

    /// Destroy `coin` held by the module account.
    fn burn(&self, store: &mut dyn KvStore, coin: &Coin) -> PeggyResult<()>;
}

/// Read-only view of bonded voting power.
///
/// CRITICAL: power is read per call; the module never caches it.
pub trait StakingKeeper: Send + Sync {
    /// Power of a bonded validator, `None` if not bonded.
    fn validator_power(&self, validator: &ValAddress) -> Option<u64>;

    /// Sum of bonded power.
    fn total_power(&self) -> u64;
}

/// Account sequences, used as the delegation binding nonce.
pub trait AccountKeeper: Send + Sync {
    fn sequence(&self, address: &AccAddress) -> u64;
}

/// Side effect applied exactly once when an attestation is observed.
///
/// Runs in a nested store; an `Err` discards its writes without reverting
/// the observation itself.
pub trait ClaimHandler: Send + Sync {
    fn handle(&self, ctx: &mut Context<'_>, params: &PeggyParams, event: &EthereumEvent) -> PeggyResult<()>;
}
