//! Nonce streams
//!
//! Each stream is a strictly increasing, gap-free sequence starting at 1:
//! the external event stream, and one batch stream per denom.

use crate::config::FutureNoncePolicy;
use crate::error::{PeggyError, PeggyResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies an independent nonce sequence.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonceStream {
    /// External-chain events (deposits, executed batches).
    Event,
    /// Finalized outgoing batches of one denom.
    Batch(String),
}

impl fmt::Display for NonceStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonceStream::Event => f.write_str("event"),
            NonceStream::Batch(denom) => write!(f, "batch/{denom}"),
        }
    }
}

/// Last fully processed nonce of a stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceCursor {
    pub stream: NonceStream,
    pub last: u64,
}

/// Where a submitted nonce falls relative to a cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoncePosition {
    /// At or below the last processed nonce.
    Past,
    /// Exactly the next expected nonce.
    Next,
    /// Beyond next expected but within the buffering window.
    Future,
}

impl NonceCursor {
    pub fn new(stream: NonceStream) -> Self {
        Self { stream, last: 0 }
    }

    pub fn next_expected(&self) -> u64 {
        self.last.saturating_add(1)
    }

    /// Move to `nonce`, which must be exactly the next expected value.
    pub fn advance(&mut self, nonce: u64) -> PeggyResult<()> {
        if nonce != self.next_expected() {
            return Err(PeggyError::NonceGap {
                stream: self.stream.to_string(),
                last: self.last,
                nonce,
            });
        }
        self.last = nonce;
        Ok(())
    }

    /// Classify an incoming nonce under `policy`.
    pub fn classify(&self, nonce: u64, policy: FutureNoncePolicy, max_gap: u64) -> PeggyResult<NoncePosition> {
        if nonce <= self.last {
            return Ok(NoncePosition::Past);
        }
        let expected = self.next_expected();
        if nonce == expected {
            return Ok(NoncePosition::Next);
        }
        match policy {
            FutureNoncePolicy::Buffer if nonce - expected <= max_gap => Ok(NoncePosition::Future),
            _ => Err(PeggyError::NonceTooHigh { nonce, expected }),
        }
    }
}
