//! # nm-04-escher
//!
//! Escher: per-name sub-trie commitments riding inside the 512-byte
//! UPDATE resource slot.
//!
//! A name in escher mode commits a 20-byte-keyed sub-trie root instead
//! of a plain resource record. Third parties mutate that sub-trie with
//! self-contained messages:
//!
//! - **REGISTER** proves a compound name absent under the current root,
//!   then binds it to a public key
//! - **UPDATE** proves the currently bound key, carries a signature
//!   under it, and rebinds
//!
//! Both messages embed the trie proof they rely on, so verification
//! needs nothing beyond the record's current data and the proposed
//! replacement: the proof is checked statelessly, the insertion is
//! simulated over the proof's own nodes, and the resulting root must
//! match the replacement data byte-for-byte.
//!
//! Once a name's data enters escher mode it can never leave it.

pub mod domain;

pub use domain::*;
