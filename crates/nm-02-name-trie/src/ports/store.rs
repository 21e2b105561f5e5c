//! Key-value storage abstraction for trie nodes.
//!
//! Keys are 32-byte node hashes. The distinguished all-zero key stores
//! the current best root. Writes only ever happen through a batch, which
//! the store applies atomically; a commit that errors out leaves no
//! partial state behind.

use shared_types::Hash;

use crate::domain::TrieError;

/// Trie node store abstraction.
pub trait TrieStore: Send + Sync {
    /// Fetch a node encoding by hash. Absence is `Ok(None)`.
    fn get_node(&self, hash: &Hash) -> Result<Option<Vec<u8>>, TrieError>;

    /// Cheap existence check.
    fn has_node(&self, hash: &Hash) -> Result<bool, TrieError> {
        Ok(self.get_node(hash)?.is_some())
    }

    /// Apply a batch of writes atomically.
    fn batch_put(&self, ops: Vec<(Hash, Vec<u8>)>) -> Result<(), TrieError>;
}

impl<T: TrieStore + ?Sized> TrieStore for &T {
    fn get_node(&self, hash: &Hash) -> Result<Option<Vec<u8>>, TrieError> {
        (**self).get_node(hash)
    }

    fn has_node(&self, hash: &Hash) -> Result<bool, TrieError> {
        (**self).has_node(hash)
    }

    fn batch_put(&self, ops: Vec<(Hash, Vec<u8>)>) -> Result<(), TrieError> {
        (**self).batch_put(ops)
    }
}

impl<T: TrieStore + ?Sized> TrieStore for std::sync::Arc<T> {
    fn get_node(&self, hash: &Hash) -> Result<Option<Vec<u8>>, TrieError> {
        (**self).get_node(hash)
    }

    fn has_node(&self, hash: &Hash) -> Result<bool, TrieError> {
        (**self).has_node(hash)
    }

    fn batch_put(&self, ops: Vec<(Hash, Vec<u8>)>) -> Result<(), TrieError> {
        (**self).batch_put(ops)
    }
}

/// Write-only accumulator handed to `commit`.
///
/// Nothing reaches the store until the host flushes the batch through
/// `TrieStore::batch_put`.
#[derive(Debug, Default)]
pub struct Batch {
    ops: Vec<(Hash, Vec<u8>)>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage one write.
    pub fn put(&mut self, hash: Hash, data: Vec<u8>) {
        self.ops.push((hash, data));
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Hand the staged writes to a store.
    pub fn into_ops(self) -> Vec<(Hash, Vec<u8>)> {
        self.ops
    }
}
