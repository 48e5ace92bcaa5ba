//! # Core Entities
//!
//! Addresses, coins and amounts shared across the workspace.
//!
//! Chain addresses (`AccAddress`, `ValAddress`) are 20-byte identifiers shown
//! as bech32 strings. External-chain addresses (`EthAddress`) are 20-byte
//! identifiers shown as `0x`-prefixed hex. Every address type serializes as
//! its string form in human-readable formats (JSON genesis files) and as raw
//! bytes in binary formats (committed store values).

use crate::errors::AddressError;
use bech32::{Bech32, Hrp};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub use primitive_types::U256;

/// 32-byte hash (Keccak-256 digests, payload hashes).
pub type Hash = [u8; 32];

/// Byte length of every address type.
pub const ADDRESS_LEN: usize = 20;

/// Bech32 prefix of account addresses.
pub const ACCOUNT_PREFIX: &str = "umee";

/// Bech32 prefix of validator operator addresses.
pub const VALIDATOR_PREFIX: &str = "umeevaloper";

fn to_address_bytes(bytes: &[u8]) -> Result<[u8; ADDRESS_LEN], AddressError> {
    <[u8; ADDRESS_LEN]>::try_from(bytes).map_err(|_| AddressError::InvalidLength {
        expected: ADDRESS_LEN,
        actual: bytes.len(),
    })
}

fn decode_bech32(prefix: &str, s: &str) -> Result<[u8; ADDRESS_LEN], AddressError> {
    if s.is_empty() {
        return Err(AddressError::Empty);
    }
    let (hrp, data) = bech32::decode(s).map_err(|e| AddressError::Bech32(e.to_string()))?;
    let actual = hrp.as_str().to_ascii_lowercase();
    if actual != prefix {
        return Err(AddressError::WrongPrefix {
            expected: prefix.to_string(),
            actual,
        });
    }
    to_address_bytes(&data)
}

fn encode_bech32(prefix: &str, bytes: &[u8]) -> Result<String, fmt::Error> {
    let hrp = Hrp::parse(prefix).map_err(|_| fmt::Error)?;
    bech32::encode::<Bech32>(hrp, bytes).map_err(|_| fmt::Error)
}

macro_rules! bech32_address {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; ADDRESS_LEN]);

        impl $name {
            /// Wrap raw address bytes.
            pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
                Self(bytes)
            }

            /// Raw address bytes.
            pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
                &self.0
            }

            /// Build from a byte slice of exactly 20 bytes.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
                to_address_bytes(bytes).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&encode_bech32($prefix, &self.0)?)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }

        impl FromStr for $name {
            type Err = AddressError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                decode_bech32($prefix, s.trim()).map(Self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.collect_str(self)
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(de::Error::custom)
                } else {
                    <[u8; ADDRESS_LEN]>::deserialize(deserializer).map(Self)
                }
            }
        }
    };
}

bech32_address!(
    /// Chain account address (orchestrators, senders, receivers).
    AccAddress,
    ACCOUNT_PREFIX
);

bech32_address!(
    /// Validator operator address.
    ValAddress,
    VALIDATOR_PREFIX
);

impl ValAddress {
    /// The account address sharing this validator's key bytes.
    pub fn to_account(&self) -> AccAddress {
        AccAddress(self.0)
    }
}

impl AccAddress {
    /// The validator operator address sharing this account's key bytes.
    pub fn to_validator(&self) -> ValAddress {
        ValAddress(self.0)
    }
}

/// External-chain (Ethereum) address.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EthAddress(pub [u8; ADDRESS_LEN]);

impl EthAddress {
    /// The zero address. Never a valid transfer destination.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Build from a byte slice of exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        to_address_bytes(bytes).map(Self)
    }

    /// True for `0x0000000000000000000000000000000000000000`.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({})", self)
    }
}

impl FromStr for EthAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: digits.len() / 2,
            });
        }
        let bytes = hex::decode(digits).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        to_address_bytes(&bytes).map(Self)
    }
}

impl Serialize for EthAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for EthAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(de::Error::custom)
        } else {
            <[u8; ADDRESS_LEN]>::deserialize(deserializer).map(Self)
        }
    }
}

/// Checks a denomination against `[a-zA-Z][a-zA-Z0-9/:._-]{2,127}`.
pub fn validate_denom(denom: &str) -> Result<(), AddressError> {
    let mut chars = denom.chars();
    let first_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '_' | '-'));
    if !first_ok || !rest_ok || !(3..=128).contains(&denom.len()) {
        return Err(AddressError::InvalidDenom(denom.to_string()));
    }
    Ok(())
}

/// An amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: U256,
}

impl Coin {
    /// Create a coin.
    pub fn new(denom: impl Into<String>, amount: impl Into<U256>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }

    /// Zero amount of `denom`.
    pub fn zero(denom: impl Into<String>) -> Self {
        Self::new(denom, U256::zero())
    }

    /// True when the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Validate the denomination.
    pub fn validate(&self) -> Result<(), AddressError> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = AddressError;

    /// Parses `"<decimal amount><denom>"`, e.g. `"1000uumee"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| AddressError::InvalidCoin(s.to_string()))?;
        if split == 0 {
            return Err(AddressError::InvalidCoin(s.to_string()));
        }
        let (amount, denom) = s.split_at(split);
        let amount =
            U256::from_dec_str(amount).map_err(|_| AddressError::InvalidCoin(s.to_string()))?;
        validate_denom(denom)?;
        Ok(Self::new(denom, amount))
    }
}
