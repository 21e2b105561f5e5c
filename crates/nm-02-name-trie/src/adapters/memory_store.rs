//! In-memory implementation of `TrieStore`.
//!
//! Used by tests, and by proof verification flows that replay a proof's
//! nodes as a throwaway backing store to simulate mutations statelessly.

use std::collections::HashMap;
use std::sync::RwLock;

use shared_types::{blake2b256, Hash};

use crate::domain::{Proof, TrieError};
use crate::ports::TrieStore;

/// HashMap-backed node store.
#[derive(Debug, Default)]
pub struct MemoryTrieStore {
    nodes: RwLock<HashMap<Hash, Vec<u8>>>,
}

impl MemoryTrieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store over a proof's nodes, keyed by their hashes.
    ///
    /// Opening a trie at the proof's root over this store lets the
    /// proof's path be traversed and mutated; anything off-path stays a
    /// pointer and surfaces as `MissingNode` when touched.
    pub fn from_proof(proof: &Proof) -> Self {
        let mut nodes = HashMap::with_capacity(proof.nodes.len());
        for enc in &proof.nodes {
            nodes.insert(blake2b256(enc), enc.clone());
        }
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        match self.nodes.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TrieStore for MemoryTrieStore {
    fn get_node(&self, hash: &Hash) -> Result<Option<Vec<u8>>, TrieError> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| TrieError::Store("trie store lock poisoned".into()))?;
        Ok(nodes.get(hash).cloned())
    }

    fn batch_put(&self, ops: Vec<(Hash, Vec<u8>)>) -> Result<(), TrieError> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| TrieError::Store("trie store lock poisoned".into()))?;
        for (hash, data) in ops {
            nodes.insert(hash, data);
        }
        Ok(())
    }
}
