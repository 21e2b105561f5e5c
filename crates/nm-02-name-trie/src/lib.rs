//! # nm-02-name-trie
//!
//! Authenticated name trie for Nomen-Chain: a radix-16 Patricia-Merkle
//! tree keyed by blake2b digests, committed incrementally into a
//! key-value store and able to prove both existence and non-existence of
//! any key against a 32-byte root.
//!
//! ## Node Types
//!
//! - **Null**: the empty tree / an empty branch slot
//! - **Hash**: a 32-byte pointer to a persisted node, resolved lazily
//! - **Short**: path-compressed prefix plus a single child
//! - **Full**: 17-way branch (16 nibbles plus the terminal value slot)
//! - **Value**: a byte payload
//!
//! ## Storage Discipline
//!
//! A node whose encoding reaches 32 bytes is persisted under its blake2b
//! hash and referenced by a HASH pointer; smaller nodes ride inline in
//! their parent's encoding. Commit hashes the dirty frontier bottom-up
//! and writes through an atomic batch; nothing reaches the store outside
//! a batch.
//!
//! ## Proofs
//!
//! A proof is the sequence of stored node encodings along the lookup
//! path. Verification is stateless: it rehashes each node, follows the
//! embedded pointers, and lands on either a value or a provable absence.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
