//! Attestations: aggregated claims for one event nonce and payload
//!
//! Each distinct payload hash claimed for a nonce gets its own attestation.
//! Power is the sum over distinct validators only, so a validator voting
//! through a rotated orchestrator key still counts once.

use super::claim::EthereumEvent;
use crate::config::Threshold;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, IfIsHumanReadable};
use shared_types::{Hash, ValAddress};

/// Aggregated votes for one (nonce, payload hash).
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub event_nonce: u64,
    #[serde_as(as = "IfIsHumanReadable<Hex>")]
    pub payload_hash: Hash,
    /// The event body, applied when the attestation is observed.
    pub event: EthereumEvent,
    /// Position among the payloads claimed for this nonce (0 = first).
    pub arrival: u32,
    /// Distinct validators in voting order.
    pub votes: Vec<ValAddress>,
    /// Power at the last tally.
    pub power: u64,
    pub observed: bool,
    /// Chain height at which the attestation was observed.
    pub observed_height: Option<u64>,
}

impl Attestation {
    pub fn new(event: EthereumEvent, payload_hash: Hash, arrival: u32) -> Self {
        Self {
            event_nonce: event.event_nonce,
            payload_hash,
            event,
            arrival,
            votes: Vec::new(),
            power: 0,
            observed: false,
            observed_height: None,
        }
    }

    pub fn has_vote(&self, validator: &ValAddress) -> bool {
        self.votes.contains(validator)
    }

    /// Record a vote. Returns false if `validator` already voted here.
    pub fn add_vote(&mut self, validator: ValAddress) -> bool {
        if self.has_vote(&validator) {
            return false;
        }
        self.votes.push(validator);
        true
    }

    /// Recompute power from current voting power of each voter.
    ///
    /// Validators that left the bonded set contribute nothing.
    pub fn tally<F>(&mut self, power_of: F) -> u64
    where
        F: Fn(&ValAddress) -> u64,
    {
        self.power = self
            .votes
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(power_of(v)));
        self.power
    }
}

/// Tally every attestation of one nonce and pick the first, in arrival
/// order, whose power reaches the threshold.
///
/// Returns the index of the winner within `attestations`.
pub fn select_winner<F>(
    attestations: &mut [Attestation],
    total_power: u64,
    quorum: &Threshold,
    power_of: F,
) -> Option<usize>
where
    F: Fn(&ValAddress) -> u64,
{
    let mut order: Vec<usize> = (0..attestations.len()).collect();
    order.sort_by_key(|&i| attestations[i].arrival);

    let mut winner = None;
    for i in order {
        let power = attestations[i].tally(&power_of);
        if winner.is_none() && quorum.is_met(power, total_power) {
            winner = Some(i);
        }
    }
    winner
}
