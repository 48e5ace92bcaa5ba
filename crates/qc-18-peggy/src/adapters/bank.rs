//! Store-backed bank
//!
//! Balances and supply live in the same transactional store as module state
//! (under `bank/`), so escrow moves are rolled back with the message.

use crate::error::{PeggyError, PeggyResult};
use crate::ports::outbound::{BankKeeper, KvStore};
use shared_crypto::keccak256;
use shared_types::{AccAddress, Coin, ADDRESS_LEN, U256};

const BALANCE_PREFIX: &[u8] = b"bank/balance/";
const SUPPLY_PREFIX: &[u8] = b"bank/supply/";

/// Module account name; the address is derived from it.
pub const MODULE_NAME: &[u8] = b"peggy";

/// Address of the module escrow account.
pub fn module_address() -> AccAddress {
    let digest = keccak256(MODULE_NAME);
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
    AccAddress::new(bytes)
}

fn balance_key(address: &AccAddress, denom: &str) -> Vec<u8> {
    let mut key = BALANCE_PREFIX.to_vec();
    key.extend_from_slice(address.as_bytes());
    key.extend_from_slice(denom.as_bytes());
    key
}

fn supply_key(denom: &str) -> Vec<u8> {
    let mut key = SUPPLY_PREFIX.to_vec();
    key.extend_from_slice(denom.as_bytes());
    key
}

fn read_amount(store: &dyn KvStore, key: &[u8]) -> PeggyResult<U256> {
    match store.get(key) {
        None => Ok(U256::zero()),
        Some(bytes) if bytes.len() == 32 => Ok(U256::from_big_endian(&bytes)),
        Some(bytes) => Err(PeggyError::Corrupted(format!(
            "bank amount has {} bytes",
            bytes.len()
        ))),
    }
}

fn write_amount(store: &mut dyn KvStore, key: Vec<u8>, amount: U256) {
    if amount.is_zero() {
        store.delete(&key);
        return;
    }
    let mut word = [0u8; 32];
    amount.to_big_endian(&mut word);
    store.set(key, word.to_vec());
}

/// Bank whose state is kept in the host store.
#[derive(Clone, Debug)]
pub struct StoreBank {
    module: AccAddress,
}

impl StoreBank {
    pub fn new() -> Self {
        Self {
            module: module_address(),
        }
    }

    pub fn module_account(&self) -> AccAddress {
        self.module
    }

    /// Credit `address` with freshly created coins (test and tool setup).
    pub fn fund(&self, store: &mut dyn KvStore, address: &AccAddress, coin: &Coin) -> PeggyResult<()> {
        self.credit(store, address, coin)?;
        self.adjust_supply(store, &coin.denom, coin.amount, true)
    }

    pub fn supply(&self, store: &dyn KvStore, denom: &str) -> PeggyResult<U256> {
        read_amount(store, &supply_key(denom))
    }

    fn credit(&self, store: &mut dyn KvStore, address: &AccAddress, coin: &Coin) -> PeggyResult<()> {
        let key = balance_key(address, &coin.denom);
        let current = read_amount(store, &key)?;
        let next = current
            .checked_add(coin.amount)
            .ok_or_else(|| PeggyError::InvalidAmount(format!("balance of {address} overflows")))?;
        write_amount(store, key, next);
        Ok(())
    }

    fn debit(&self, store: &mut dyn KvStore, address: &AccAddress, coin: &Coin) -> PeggyResult<()> {
        let key = balance_key(address, &coin.denom);
        let current = read_amount(store, &key)?;
        let next = current
            .checked_sub(coin.amount)
            .ok_or_else(|| PeggyError::InsufficientFunds {
                address: address.to_string(),
                denom: coin.denom.clone(),
                available: current.to_string(),
                needed: coin.amount.to_string(),
            })?;
        write_amount(store, key, next);
        Ok(())
    }

    fn adjust_supply(&self, store: &mut dyn KvStore, denom: &str, amount: U256, increase: bool) -> PeggyResult<()> {
        let key = supply_key(denom);
        let current = read_amount(store, &key)?;
        let next = if increase {
            current.checked_add(amount)
        } else {
            current.checked_sub(amount)
        }
        .ok_or_else(|| PeggyError::Corrupted(format!("supply of {denom} out of range")))?;
        write_amount(store, key, next);
        Ok(())
    }
}

impl Default for StoreBank {
    fn default() -> Self {
        Self::new()
    }
}

impl BankKeeper for StoreBank {
    fn balance(&self, store: &dyn KvStore, address: &AccAddress, denom: &str) -> PeggyResult<U256> {
        read_amount(store, &balance_key(address, denom))
    }

    fn send_to_module(&self, store: &mut dyn KvStore, from: &AccAddress, coin: &Coin) -> PeggyResult<()> {
        self.debit(store, from, coin)?;
        self.credit(store, &self.module, coin)
    }

    fn send_from_module(&self, store: &mut dyn KvStore, to: &AccAddress, coin: &Coin) -> PeggyResult<()> {
        self.debit(store, &self.module, coin)?;
        self.credit(store, to, coin)
    }

    fn mint(&self, store: &mut dyn KvStore, coin: &Coin) -> PeggyResult<()> {
        self.credit(store, &self.module, coin)?;
        self.adjust_supply(store, &coin.denom, coin.amount, true)
    }

    fn burn(&self, store: &mut dyn KvStore, coin: &Coin) -> PeggyResult<()> {
        self.debit(store, &self.module, coin)?;
        self.adjust_supply(store, &coin.denom, coin.amount, false)
    }
}
