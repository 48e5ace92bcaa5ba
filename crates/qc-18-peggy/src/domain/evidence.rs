//! Fork and equivocation evidence
//!
//! Evidence is collected by the service outside consensus state: the
//! transaction that revealed it is rejected and rolled back, but the record
//! survives for governance and slashing tooling.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, IfIsHumanReadable};
use shared_types::{AccAddress, Hash, ValAddress};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    /// A claim contradicts an already observed payload for the same nonce.
    ConflictingClaim,
    /// A validator voted for two different payloads at the same nonce.
    Equivocation,
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkEvidence {
    pub kind: EvidenceKind,
    pub event_nonce: u64,
    pub validator: ValAddress,
    pub orchestrator: AccAddress,
    /// Payload the chain observed (or the validator voted for first).
    #[serde_as(as = "IfIsHumanReadable<Hex>")]
    pub recorded_hash: Hash,
    /// Payload carried by the offending claim.
    #[serde_as(as = "IfIsHumanReadable<Hex>")]
    pub submitted_hash: Hash,
    pub block_height: u64,
}
