//! Module parameters
//!
//! Parameters are set at genesis and live in committed storage, so every
//! node reads the same values while executing a block.

use crate::error::{PeggyError, PeggyResult};
use serde::{Deserialize, Serialize};
use shared_types::{validate_denom, EthAddress, U256};
use std::collections::BTreeMap;

/// Fraction of total bonded power required to finalize attestations and batches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub numerator: u64,
    pub denominator: u64,
}

impl Threshold {
    /// Two thirds of total power.
    pub const TWO_THIRDS: Self = Self {
        numerator: 2,
        denominator: 3,
    };

    /// Power needed out of `total`: `ceil(total * numerator / denominator)`.
    ///
    /// Never less than 1, so an empty validator set finalizes nothing.
    pub fn required_power(&self, total: u64) -> u64 {
        let num = u128::from(total) * u128::from(self.numerator);
        let den = u128::from(self.denominator.max(1));
        let required = num.div_ceil(den);
        u64::try_from(required).unwrap_or(u64::MAX).max(1)
    }

    /// True when `power` out of `total` reaches the threshold.
    pub fn is_met(&self, power: u64, total: u64) -> bool {
        power >= self.required_power(total)
    }

    fn validate(&self) -> PeggyResult<()> {
        if self.denominator == 0 || self.numerator > self.denominator {
            return Err(PeggyError::InvalidParams(format!(
                "quorum {}/{} is not a fraction in (0, 1]",
                self.numerator, self.denominator
            )));
        }
        // A quorum at or below one half lets two disjoint sets finalize.
        if u128::from(self.numerator) * 2 <= u128::from(self.denominator) {
            return Err(PeggyError::InvalidParams(format!(
                "quorum {}/{} must exceed one half",
                self.numerator, self.denominator
            )));
        }
        Ok(())
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::TWO_THIRDS
    }
}

/// What to do with a claim whose nonce is beyond the next expected one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FutureNoncePolicy {
    /// Reject with `NonceTooHigh`; orchestrators resubmit in order.
    #[default]
    Reject,
    /// Record the vote without counting it until every earlier nonce is observed.
    Buffer,
}

/// Peggy module parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeggyParams {
    /// Domain separator mixed into every batch digest.
    pub peggy_id: String,
    /// Chain id of the external network.
    pub bridge_chain_id: u64,
    /// Finalization threshold.
    pub quorum: Threshold,
    /// Minimum bridge fee per outgoing transfer, in the transfer's denom.
    pub min_bridge_fee: U256,
    /// Maximum transfers per batch.
    pub max_batch_size: u32,
    /// Blocks a batch may stay pending before it can be timed out.
    pub batch_timeout_blocks: u64,
    pub future_nonce_policy: FutureNoncePolicy,
    /// Furthest a buffered claim may run ahead of the next expected nonce.
    pub max_buffered_nonce_gap: u64,
    /// Chain-native denoms represented on the external chain by an ERC20.
    pub erc20_to_denom: BTreeMap<EthAddress, String>,
}

impl Default for PeggyParams {
    fn default() -> Self {
        Self {
            peggy_id: "umee-peggy".to_string(),
            bridge_chain_id: 1,
            quorum: Threshold::default(),
            min_bridge_fee: U256::zero(),
            max_batch_size: 100,
            batch_timeout_blocks: 10_000,
            future_nonce_policy: FutureNoncePolicy::Reject,
            max_buffered_nonce_gap: 100,
            erc20_to_denom: BTreeMap::new(),
        }
    }
}

impl PeggyParams {
    /// Check parameter consistency.
    pub fn validate(&self) -> PeggyResult<()> {
        if self.peggy_id.is_empty() {
            return Err(PeggyError::InvalidParams("peggy_id is empty".into()));
        }
        self.quorum.validate()?;
        if self.max_batch_size == 0 {
            return Err(PeggyError::InvalidParams("max_batch_size is zero".into()));
        }
        if self.batch_timeout_blocks == 0 {
            return Err(PeggyError::InvalidParams("batch_timeout_blocks is zero".into()));
        }
        if self.future_nonce_policy == FutureNoncePolicy::Buffer && self.max_buffered_nonce_gap == 0 {
            return Err(PeggyError::InvalidParams(
                "buffer policy needs a non-zero max_buffered_nonce_gap".into(),
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        for (contract, denom) in &self.erc20_to_denom {
            if contract.is_zero() {
                return Err(PeggyError::InvalidParams("erc20 mapping for zero address".into()));
            }
            validate_denom(denom)?;
            if !seen.insert(denom) {
                return Err(PeggyError::InvalidParams(format!("denom {denom} mapped twice")));
            }
        }
        Ok(())
    }

    /// Native denom backed by `contract`, if any.
    pub fn native_denom(&self, contract: &EthAddress) -> Option<&str> {
        self.erc20_to_denom.get(contract).map(String::as_str)
    }

    /// ERC20 contract representing `denom`, if it is a mapped native denom.
    pub fn contract_for_denom(&self, denom: &str) -> Option<EthAddress> {
        self.erc20_to_denom
            .iter()
            .find(|(_, d)| d.as_str() == denom)
            .map(|(c, _)| *c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_thirds_of_hundred_is_67() {
        assert_eq!(Threshold::TWO_THIRDS.required_power(100), 67);
        assert!(Threshold::TWO_THIRDS.is_met(67, 100));
        assert!(!Threshold::TWO_THIRDS.is_met(66, 100));
    }

    #[test]
    fn test_required_power_rounds_up() {
        assert_eq!(Threshold::TWO_THIRDS.required_power(3), 2);
        assert_eq!(Threshold::TWO_THIRDS.required_power(4), 3);
        assert_eq!(Threshold::TWO_THIRDS.required_power(0), 1);
        assert_eq!(Threshold::TWO_THIRDS.required_power(u64::MAX), u64::MAX / 3 * 2);
    }

    #[test]
    fn test_default_params_valid() {
        assert!(PeggyParams::default().validate().is_ok());
    }

    #[test]
    fn test_half_quorum_rejected() {
        let params = PeggyParams {
            quorum: Threshold { numerator: 1, denominator: 2 },
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(PeggyError::InvalidParams(_))));
    }

    #[test]
    fn test_duplicate_denom_mapping_rejected() {
        let mut params = PeggyParams::default();
        params.erc20_to_denom.insert(EthAddress::new([1; 20]), "uumee".into());
        params.erc20_to_denom.insert(EthAddress::new([2; 20]), "uumee".into());
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_denom_lookup_both_ways() {
        let mut params = PeggyParams::default();
        let contract = EthAddress::new([3; 20]);
        params.erc20_to_denom.insert(contract, "uumee".into());
        assert_eq!(params.native_denom(&contract), Some("uumee"));
        assert_eq!(params.contract_for_denom("uumee"), Some(contract));
        assert_eq!(params.contract_for_denom("uatom"), None);
    }

    #[test]
    fn test_params_json_roundtrip() {
        let mut params = PeggyParams::default();
        params.erc20_to_denom.insert(EthAddress::new([3; 20]), "uumee".into());
        let json = serde_json::to_string(&params).unwrap();
        let back: PeggyParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
