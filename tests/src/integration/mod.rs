//! Cross-crate integration scenarios.

pub mod auction_lifecycle;
pub mod codec_roundtrip;
pub mod escher_flow;
pub mod mempool_invalidation;
pub mod undo_rollback;
