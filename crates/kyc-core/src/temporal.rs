//! # Temporal Types — Ledger Block Heights
//!
//! The registries never read a wall clock. Every "last updated" field is the
//! block height at which the mutating call was executed, handed in through
//! the [`CallContext`](crate::CallContext). This keeps each transition a pure
//! function of `(state, caller, arguments, height)`.

use serde::{Deserialize, Serialize};

/// Monotonic logical clock of the ledger, one tick per executed call.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    /// Height of a freshly deployed ledger, before any call executes.
    pub const GENESIS: BlockHeight = BlockHeight(0);

    /// Access the raw height.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The height following this one.
    pub fn next(&self) -> BlockHeight {
        BlockHeight(self.0.saturating_add(1))
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
