//! # Peggy Bridge Test Suite
//!
//! Cross-crate tests for the bridge module.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── simulation.rs     # Seeded random chain driver with invariant checks
//! │
//! └── integration/      # End-to-end flows
//!     ├── bridge_flows.rs     # Deposit, withdrawal and timeout round trips
//!     ├── simulation_runs.rs  # Long runs and determinism
//!     ├── genesis_import.rs   # Export / re-import byte identity
//!     └── properties.rs       # Quorum and nonce properties
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # By category
//! cargo test -p qc-tests integration::simulation_runs::
//!
//! # Longer simulation
//! PEGGY_SIM_BLOCKS=2000 cargo test -p qc-tests --release simulation
//! ```

pub mod integration;
pub mod simulation;
