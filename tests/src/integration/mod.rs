//! # Integration Tests
//!
//! End-to-end runs of the bridge module over the in-memory host adapters.

pub mod bridge_flows;
pub mod genesis_import;
pub mod properties;
pub mod simulation_runs;
