//! Trie and proof error types.

use shared_types::{EncodingError, Hash};
use thiserror::Error;

/// Errors raised by trie operations.
///
/// `MissingNode` on a live chain indicates database corruption; callers
/// abort the enclosing epoch rather than treating it as absence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrieError {
    /// A HASH pointer could not be resolved through the backing store.
    #[error(
        "missing trie node {} under root {} (key {}, nibble {depth})",
        hex::encode(.node_hash),
        hex::encode(.root),
        hex::encode(.key)
    )]
    MissingNode {
        /// Root the traversal started from.
        root: Hash,
        /// Hash that failed to resolve.
        node_hash: Hash,
        /// Key being traversed.
        key: Vec<u8>,
        /// Nibble position at the failure.
        depth: usize,
    },

    /// A stored node decoded to an impossible layout.
    #[error("malformed trie node: {0}")]
    Malformed(String),

    /// Key width does not match this trie.
    #[error("bad key size: expected {expected} bytes, got {actual}")]
    BadKeySize { expected: usize, actual: usize },

    /// The backing store failed.
    #[error("store error: {0}")]
    Store(String),

    /// Low-level wire failure while decoding a node.
    #[error("codec failure: {0}")]
    Codec(#[from] EncodingError),
}

/// Stateless proof verification failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProofError {
    /// A proof node does not hash to the pointer that referenced it.
    #[error("proof node hash mismatch")]
    HashMismatch,

    /// A proof node failed to decode.
    #[error("malformed proof node")]
    MalformedNode,

    /// A node appeared where the traversal could not use it.
    #[error("unexpected proof node")]
    UnexpectedNode,

    /// The proof ended while a pointer still needed resolution.
    #[error("proof ended early")]
    EarlyEnd,

    /// The proof produced neither a value nor a provable absence.
    #[error("proof reached no result")]
    NoResult,
}
