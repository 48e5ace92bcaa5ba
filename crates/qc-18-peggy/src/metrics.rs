//! # Bridge Metrics
//!
//! Prometheus counters for the Peggy module.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-18-peggy = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `peggy_claims_total` - Claims counted, by claim type
//! - `peggy_attestations_observed_total` - Attestations that reached quorum
//! - `peggy_messages_rejected_total` - Rejected messages, by reason
//! - `peggy_claim_handler_failures_total` - Side effects that failed and were discarded
//! - `peggy_batches_created_total` - Outgoing batches created
//! - `peggy_batches_finalized_total` - Outgoing batches that reached quorum
//! - `peggy_batches_timed_out_total` - Outgoing batches timed out
//! - `peggy_fork_evidence_total` - Fork evidence recorded, by kind

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_counter_vec, register_int_counter, CounterVec, IntCounter};

#[cfg(feature = "metrics")]
lazy_static! {
    pub static ref CLAIMS: CounterVec = register_counter_vec!(
        "peggy_claims_total",
        "Total number of claims counted",
        &["claim_type"]
    )
    .expect("Failed to create CLAIMS metric");

    pub static ref ATTESTATIONS_OBSERVED: IntCounter = register_int_counter!(
        "peggy_attestations_observed_total",
        "Total number of attestations observed"
    )
    .expect("Failed to create ATTESTATIONS_OBSERVED metric");

    /// Rejected messages, labeled by error reason
    pub static ref MESSAGES_REJECTED: CounterVec = register_counter_vec!(
        "peggy_messages_rejected_total",
        "Total number of rejected messages",
        &["reason"]
    )
    .expect("Failed to create MESSAGES_REJECTED metric");

    pub static ref CLAIM_HANDLER_FAILURES: IntCounter = register_int_counter!(
        "peggy_claim_handler_failures_total",
        "Total number of failed claim side effects"
    )
    .expect("Failed to create CLAIM_HANDLER_FAILURES metric");

    pub static ref BATCHES_CREATED: IntCounter = register_int_counter!(
        "peggy_batches_created_total",
        "Total number of outgoing batches created"
    )
    .expect("Failed to create BATCHES_CREATED metric");

    pub static ref BATCHES_FINALIZED: IntCounter = register_int_counter!(
        "peggy_batches_finalized_total",
        "Total number of outgoing batches finalized"
    )
    .expect("Failed to create BATCHES_FINALIZED metric");

    pub static ref BATCHES_TIMED_OUT: IntCounter = register_int_counter!(
        "peggy_batches_timed_out_total",
        "Total number of outgoing batches timed out"
    )
    .expect("Failed to create BATCHES_TIMED_OUT metric");

    pub static ref FORK_EVIDENCE: CounterVec = register_counter_vec!(
        "peggy_fork_evidence_total",
        "Total number of fork evidence records",
        &["kind"]
    )
    .expect("Failed to create FORK_EVIDENCE metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

#[cfg(feature = "metrics")]
pub fn record_claim(claim_type: &str) {
    CLAIMS.with_label_values(&[claim_type]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_attestation_observed() {
    ATTESTATIONS_OBSERVED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_message_rejected(reason: &str) {
    MESSAGES_REJECTED.with_label_values(&[reason]).inc();
}

#[cfg(feature = "metrics")]
pub fn record_claim_handler_failure() {
    CLAIM_HANDLER_FAILURES.inc();
}

#[cfg(feature = "metrics")]
pub fn record_batch_created() {
    BATCHES_CREATED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_batch_finalized() {
    BATCHES_FINALIZED.inc();
}

#[cfg(feature = "metrics")]
pub fn record_batch_timed_out() {
    BATCHES_TIMED_OUT.inc();
}

#[cfg(feature = "metrics")]
pub fn record_fork_evidence(kind: &str) {
    FORK_EVIDENCE.with_label_values(&[kind]).inc();
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_claim(_claim_type: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_attestation_observed() {}

#[cfg(not(feature = "metrics"))]
pub fn record_message_rejected(_reason: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_claim_handler_failure() {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch_created() {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch_finalized() {}

#[cfg(not(feature = "metrics"))]
pub fn record_batch_timed_out() {}

#[cfg(not(feature = "metrics"))]
pub fn record_fork_evidence(_kind: &str) {}
