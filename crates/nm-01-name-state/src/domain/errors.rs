//! Name-state error types.
//!
//! All errors are recoverable values. On the chain-connect path they
//! abort the block; on the mempool path the host surfaces them as
//! rejects.

use shared_types::{Covenant, EncodingError, NameHash};
use thiserror::Error;

use super::namestate::NamePhase;

fn fmt_hash(hash: &NameHash) -> String {
    hex::encode(&hash[..8])
}

/// Errors raised by name-record mutation and block application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameStateError {
    /// The covenant is not admissible in the name's current phase.
    #[error("covenant {covenant:?} not admissible in phase {phase:?} for name {}", fmt_hash(.name_hash))]
    InvalidCovenant {
        covenant: Covenant,
        phase: NamePhase,
        name_hash: NameHash,
    },

    /// An operand name does not hash to the referenced name hash.
    #[error("name preimage does not match hash {}", fmt_hash(.0))]
    NameMismatch(NameHash),

    /// Name exceeds the 63-byte label limit.
    #[error("name oversized: {0} bytes")]
    NameOversized(usize),

    /// Resource data exceeds the 512-byte limit.
    #[error("record data oversized: {0} bytes")]
    DataOversized(usize),

    /// FINALIZE before the transfer lock-up matured.
    #[error("transfer immature: started at {started}, height {height}")]
    TransferImmature { started: u32, height: u32 },

    /// A transfer is already pending for this name.
    #[error("transfer already pending for name {}", fmt_hash(.0))]
    TransferPending(NameHash),

    /// Transfer or update attempted during a weak claim lock-up.
    #[error("name {} is weak-locked", fmt_hash(.0))]
    WeakLockup(NameHash),

    /// CLAIM after the network claim period closed.
    #[error("claim period over at height {0}")]
    ClaimPeriodOver(u32),

    /// Operation requires committed data that was never registered.
    #[error("name {} is not registered", fmt_hash(.0))]
    NotRegistered(NameHash),

    /// A record, delta, or undo bundle failed to decode.
    #[error("codec failure: {0}")]
    Codec(#[from] EncodingError),

    /// The backing name store failed.
    #[error("store error: {0}")]
    Store(String),
}
