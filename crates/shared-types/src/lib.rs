//! # Shared Types Crate
//!
//! Primitive types shared by the bridge module, its tooling and tests.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every address and coin type is defined here.
//! - **Fixed-width identities**: all addresses are 20 bytes; only their text
//!   encoding differs (bech32 for chain addresses, hex for external ones).

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
