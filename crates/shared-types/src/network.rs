//! Consensus network parameters.
//!
//! All auction phase boundaries are derived from these block counts. The
//! phase function itself lives in `nm-01-name-state`; these numbers are
//! the only knobs it consumes.

use serde::{Deserialize, Serialize};

/// Phase lengths and windows, in blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    /// Blocks between trie commits. The open period is one interval plus
    /// one block.
    pub tree_interval: u32,
    /// Length of the sealed-bid window.
    pub bidding_period: u32,
    /// Length of the reveal window.
    pub reveal_period: u32,
    /// Lock-up applied to claimed (reserved) names before they close.
    pub lockup_period: u32,
    /// Window within which an owner must renew.
    pub renewal_window: u32,
    /// Blocks after revocation before the name can be reopened.
    pub auction_maturity: u32,
    /// Blocks a transfer must mature before FINALIZE is admissible.
    pub transfer_lockup: u32,
    /// Window during which reserved names may be claimed; claimed names
    /// are renewal-protected inside it.
    pub claim_period: u32,
    /// Extended lock-up for weakly-proven claims.
    pub weak_lockup: u32,
}

impl NetworkParams {
    /// Main network parameters.
    pub fn main() -> Self {
        Self {
            tree_interval: 36,
            bidding_period: 720,
            reveal_period: 1440,
            lockup_period: 4320,
            renewal_window: 105_120,
            auction_maturity: 2160,
            transfer_lockup: 288,
            claim_period: 210_240,
            weak_lockup: 8640,
        }
    }

    /// Compressed schedule for simulation and tests.
    pub fn simnet() -> Self {
        Self {
            tree_interval: 4,
            bidding_period: 5,
            reveal_period: 3,
            lockup_period: 6,
            renewal_window: 50,
            auction_maturity: 10,
            transfer_lockup: 4,
            claim_period: 60,
            weak_lockup: 12,
        }
    }

    /// Blocks in the OPENING phase.
    pub fn open_period(&self) -> u32 {
        self.tree_interval + 1
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::main()
    }
}
