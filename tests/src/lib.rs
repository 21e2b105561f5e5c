//! # Nomen-Chain Test Suite
//!
//! Unified test crate for cross-crate scenarios.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── auction_lifecycle.rs    # phase schedule and expiry over full auctions
//!     ├── codec_roundtrip.rs      # randomized record/delta/undo codecs
//!     ├── undo_rollback.rs        # connect/disconnect byte-for-byte restoration
//!     ├── trie_proofs.rs          # commit, collapse, proof soundness
//!     ├── mempool_invalidation.rs # phase-boundary eviction coverage
//!     └── escher_flow.rs          # sub-trie commitment end-to-end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p nm-tests
//! cargo test -p nm-tests integration::
//! ```

#[cfg(test)]
pub mod integration;

/// Initialize tracing for a test run; safe to call repeatedly.
#[cfg(test)]
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
