//! # nm-03-mempool-names
//!
//! Mempool-side name tracking for Nomen-Chain.
//!
//! The mempool cannot wait for a block to discover that a phase boundary
//! broke its contents: an OPEN sitting in the pool becomes consensus-
//! invalid the moment its auction enters BIDDING, a REVEAL dies when the
//! auction closes, and every update-class transaction dies when the
//! record expires. This crate maintains the reverse indices and shadow
//! records needed to answer, before each block, "which in-flight
//! transactions does the next height invalidate?".
//!
//! ## Structure
//!
//! - per-name reference counts (a record is cached only while some
//!   transaction references it)
//! - four category indices: OPENs, BIDs, REVEALs (including CLAIMs),
//!   and the update-class catch-all
//! - a shadow view of each watched name's on-chain record, data
//!   stripped
//!
//! The invalidation query is pure and idempotent; it can run at any
//! point between blocks.

pub mod domain;

pub use domain::*;
