//! In-memory validator set and account sequences

use crate::ports::outbound::{AccountKeeper, StakingKeeper};
use parking_lot::RwLock;
use shared_types::{AccAddress, ValAddress};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Bonded validator set held in memory.
///
/// Power changes take effect on the next tally; nothing in module state is
/// rewritten when the set changes.
#[derive(Debug, Default)]
pub struct InMemoryStaking {
    powers: RwLock<BTreeMap<ValAddress, u64>>,
}

impl InMemoryStaking {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_powers<I>(powers: I) -> Self
    where
        I: IntoIterator<Item = (ValAddress, u64)>,
    {
        Self {
            powers: RwLock::new(powers.into_iter().collect()),
        }
    }

    /// Bond `validator` with `power`, or update its power.
    pub fn set_power(&self, validator: ValAddress, power: u64) {
        debug!("[qc-18] Power of {} set to {}", validator, power);
        self.powers.write().insert(validator, power);
    }

    /// Unbond `validator`.
    pub fn remove(&self, validator: &ValAddress) {
        debug!("[qc-18] Validator {} unbonded", validator);
        self.powers.write().remove(validator);
    }

    pub fn validators(&self) -> Vec<ValAddress> {
        self.powers.read().keys().copied().collect()
    }
}

impl StakingKeeper for InMemoryStaking {
    fn validator_power(&self, validator: &ValAddress) -> Option<u64> {
        self.powers.read().get(validator).copied()
    }

    fn total_power(&self) -> u64 {
        self.powers.read().values().fold(0u64, |acc, p| acc.saturating_add(*p))
    }
}

/// Account sequences held in memory.
#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    sequences: RwLock<HashMap<AccAddress, u64>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_sequence(&self, address: AccAddress, sequence: u64) {
        self.sequences.write().insert(address, sequence);
    }

    /// Bump the sequence as the host does after each signed transaction.
    pub fn increment(&self, address: &AccAddress) -> u64 {
        let mut sequences = self.sequences.write();
        let entry = sequences.entry(*address).or_insert(0);
        *entry += 1;
        *entry
    }
}

impl AccountKeeper for InMemoryAccounts {
    fn sequence(&self, address: &AccAddress) -> u64 {
        self.sequences.read().get(address).copied().unwrap_or(0)
    }
}
