//! The authenticated name trie.
//!
//! Keys are fixed-width digests; the width is configured per trie
//! (32 bytes for the main name tree, 20 bytes for the Escher sub-tries).
//! Lookups resolve HASH pointers lazily through the backing store;
//! mutation rebuilds the touched path with dirty nodes; `commit` hashes
//! the dirty frontier bottom-up into an atomic batch and stores the best
//! root under the all-zero key.

use shared_types::{blake2b256, Hash, NetworkParams, ZERO_HASH};

use super::errors::TrieError;
use super::nibbles::Nibbles;
use super::node::{
    empty_trie_root, encode_full, encode_hash_ref, encode_null, encode_short, encode_value,
    decode_node, FullNode, Node, NodeFlags, ShortNode, HASH_THRESHOLD,
};
use super::proof::{walk_step, Proof, Step};
use crate::ports::{Batch, TrieStore};

/// Key width of the main name tree (blake2b-256 digests).
pub const MAIN_KEY_SIZE: usize = 32;

/// Key width of the Escher sub-tries (blake2b-160 digests).
pub const SUB_KEY_SIZE: usize = 20;

/// Trie cache tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrieConfig {
    /// Clean nodes whose generation lags the current one by more than
    /// this collapse back to HASH pointers on `evict`.
    pub cache_generations: u32,
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self {
            cache_generations: 2,
        }
    }
}

/// Radix-16 Patricia-Merkle trie over a key-value node store.
pub struct NameTrie<D: TrieStore> {
    db: D,
    root: Node,
    key_size: usize,
    generation: u32,
    committed_root: Option<Hash>,
    config: TrieConfig,
}

impl<D: TrieStore> NameTrie<D> {
    /// Fresh empty trie.
    pub fn new(db: D, key_size: usize) -> Self {
        Self::with_config(db, key_size, TrieConfig::default())
    }

    /// Fresh empty trie with cache tuning.
    pub fn with_config(db: D, key_size: usize, config: TrieConfig) -> Self {
        Self {
            db,
            root: Node::Null,
            key_size,
            generation: 0,
            committed_root: None,
            config,
        }
    }

    /// Open a trie at a committed root.
    pub fn open(db: D, key_size: usize, root: Hash) -> Self {
        let node = if root == empty_trie_root() {
            Node::Null
        } else {
            Node::Hash(root)
        };
        Self {
            db,
            root: node,
            key_size,
            generation: 0,
            committed_root: Some(root),
            config: TrieConfig::default(),
        }
    }

    /// Read the best root recorded at the store's zero key.
    pub fn best_root(db: &D) -> Result<Option<Hash>, TrieError> {
        match db.get_node(&ZERO_HASH)? {
            None => Ok(None),
            Some(bytes) => {
                if bytes.len() != 32 {
                    return Err(TrieError::Malformed("best-root slot is not a hash".into()));
                }
                let mut root = [0u8; 32];
                root.copy_from_slice(&bytes);
                Ok(Some(root))
            }
        }
    }

    /// Configured key width in bytes.
    pub fn key_size(&self) -> usize {
        self.key_size
    }

    /// Root of the last commit, if any.
    pub fn committed_root(&self) -> Option<Hash> {
        self.committed_root
    }

    /// Height interval between commits, for hosts that fold name data on
    /// the tree interval.
    pub fn commit_interval(params: &NetworkParams) -> u32 {
        params.tree_interval
    }

    fn check_key(&self, key: &[u8]) -> Result<(), TrieError> {
        if key.len() != self.key_size {
            return Err(TrieError::BadKeySize {
                expected: self.key_size,
                actual: key.len(),
            });
        }
        Ok(())
    }

    fn missing(&self, node_hash: &Hash, key: &[u8], depth: usize) -> TrieError {
        TrieError::MissingNode {
            root: self.committed_root.unwrap_or(ZERO_HASH),
            node_hash: *node_hash,
            key: key.to_vec(),
            depth,
        }
    }

    /// Fetch a stored encoding; absence is fatal.
    fn fetch(&self, hash: &Hash, key: &[u8], depth: usize) -> Result<Vec<u8>, TrieError> {
        self.db
            .get_node(hash)?
            .ok_or_else(|| self.missing(hash, key, depth))
    }

    /// Resolve a HASH pointer into a decoded node.
    fn resolve(&self, hash: &Hash, key: &[u8], depth: usize) -> Result<Node, TrieError> {
        let bytes = self.fetch(hash, key, depth)?;
        let mut node = decode_node(&bytes)?;
        match &mut node {
            Node::Short(s) => s.flags = NodeFlags::clean(Some(*hash), self.generation),
            Node::Full(f) => f.flags = NodeFlags::clean(Some(*hash), self.generation),
            _ => {}
        }
        Ok(node)
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Fetch the value stored under `key`, resolving pointers through
    /// the store. Reads leave the in-memory tree untouched.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, TrieError> {
        self.check_key(key)?;
        let nib = Nibbles::from_key(key);
        self.get_at(&self.root, key, &nib, 0)
    }

    fn get_at(
        &self,
        node: &Node,
        key: &[u8],
        nib: &Nibbles,
        depth: usize,
    ) -> Result<Option<Vec<u8>>, TrieError> {
        match node {
            Node::Null => Ok(None),

            Node::Value(v) => {
                if depth != nib.len() {
                    return Err(TrieError::Malformed("value node above key depth".into()));
                }
                Ok(Some(v.clone()))
            }

            Node::Short(s) => {
                if !s.key.matches_at(nib, depth) {
                    return Ok(None);
                }
                self.get_at(&s.child, key, nib, depth + s.key.len())
            }

            Node::Full(f) => {
                if depth >= nib.len() {
                    return Err(TrieError::Malformed("branch below key depth".into()));
                }
                let idx = nib.at(depth) as usize;
                self.get_at(&f.children[idx], key, nib, depth + 1)
            }

            Node::Hash(h) => {
                let resolved = self.resolve(h, key, depth)?;
                self.get_at(&resolved, key, nib, depth)
            }
        }
    }

    // =========================================================================
    // MUTATION
    // =========================================================================

    /// Insert or replace the value under `key`.
    pub fn insert(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), TrieError> {
        self.check_key(key)?;
        let nib = Nibbles::from_key(key);
        let root = std::mem::take(&mut self.root);
        self.root = self.insert_node(root, key, &nib, 0, value)?;
        Ok(())
    }

    fn insert_node(
        &self,
        node: Node,
        key: &[u8],
        nib: &Nibbles,
        depth: usize,
        value: Vec<u8>,
    ) -> Result<Node, TrieError> {
        if depth == nib.len() {
            // Past the terminal sentinel: this is the value position.
            return Ok(Node::Value(value));
        }

        match node {
            Node::Null => Ok(Node::short(
                nib.slice(depth),
                Node::Value(value),
                self.generation,
            )),

            Node::Hash(h) => {
                let resolved = self.resolve(&h, key, depth)?;
                self.insert_node(resolved, key, nib, depth, value)
            }

            Node::Value(_) => Err(TrieError::Malformed("value node above key depth".into())),

            Node::Short(s) => {
                let rest = nib.slice(depth);
                let cp = s.key.common_prefix_len(&rest);

                if cp == s.key.len() {
                    let child = self.insert_node(*s.child, key, nib, depth + cp, value)?;
                    return Ok(Node::short(s.key, child, self.generation));
                }

                // Split at the divergence point.
                let mut full = FullNode {
                    flags: NodeFlags::dirty(self.generation),
                    ..Default::default()
                };
                let existing_idx = s.key.at(cp) as usize;
                let existing_rest = s.key.slice(cp + 1);
                full.children[existing_idx] = if existing_rest.is_empty() {
                    *s.child
                } else {
                    Node::short(existing_rest, *s.child, self.generation)
                };

                let branch =
                    self.insert_node(Node::Full(Box::new(full)), key, nib, depth + cp, value)?;
                if cp > 0 {
                    Ok(Node::short(
                        nib.slice_range(depth, depth + cp),
                        branch,
                        self.generation,
                    ))
                } else {
                    Ok(branch)
                }
            }

            Node::Full(mut f) => {
                let idx = nib.at(depth) as usize;
                let child = std::mem::take(&mut f.children[idx]);
                f.children[idx] = self.insert_node(child, key, nib, depth + 1, value)?;
                f.flags = NodeFlags::dirty(self.generation);
                Ok(Node::Full(f))
            }
        }
    }

    /// Remove the value under `key`, collapsing redundant structure.
    /// Returns whether a value was removed.
    pub fn remove(&mut self, key: &[u8]) -> Result<bool, TrieError> {
        self.check_key(key)?;
        let nib = Nibbles::from_key(key);
        let root = std::mem::take(&mut self.root);
        let (root, removed) = self.remove_node(root, key, &nib, 0)?;
        self.root = root;
        Ok(removed)
    }

    fn remove_node(
        &self,
        node: Node,
        key: &[u8],
        nib: &Nibbles,
        depth: usize,
    ) -> Result<(Node, bool), TrieError> {
        if depth == nib.len() {
            // Value position; a HASH here points at a stored value node.
            return Ok(match node {
                Node::Null => (Node::Null, false),
                _ => (Node::Null, true),
            });
        }

        match node {
            Node::Null => Ok((Node::Null, false)),

            Node::Hash(h) => {
                let resolved = self.resolve(&h, key, depth)?;
                self.remove_node(resolved, key, nib, depth)
            }

            Node::Value(_) => Err(TrieError::Malformed("value node above key depth".into())),

            Node::Short(s) => {
                if !s.key.matches_at(nib, depth) {
                    return Ok((Node::Short(s), false));
                }
                let skip = s.key.len();
                let (child, removed) = self.remove_node(*s.child, key, nib, depth + skip)?;
                if !removed {
                    return Ok((
                        Node::Short(ShortNode {
                            key: s.key,
                            child: Box::new(child),
                            flags: s.flags,
                        }),
                        false,
                    ));
                }

                Ok(match child {
                    Node::Null => (Node::Null, true),
                    // A short chain flattens into one node.
                    Node::Short(c) => (
                        Node::short(s.key.join(&c.key), *c.child, self.generation),
                        true,
                    ),
                    other => (Node::short(s.key, other, self.generation), true),
                })
            }

            Node::Full(mut f) => {
                let idx = nib.at(depth) as usize;
                let child = std::mem::take(&mut f.children[idx]);
                let (child, removed) = self.remove_node(child, key, nib, depth + 1)?;
                f.children[idx] = child;

                if !removed {
                    return Ok((Node::Full(f), false));
                }

                let remaining: Vec<usize> = f
                    .children
                    .iter()
                    .enumerate()
                    .filter(|(_, c)| !c.is_null())
                    .map(|(i, _)| i)
                    .collect();

                match remaining.len() {
                    0 => Ok((Node::Null, true)),

                    // A branch with one survivor rewrites as a short
                    // node keyed by the branch nibble.
                    1 => {
                        let only = remaining[0];
                        let survivor = std::mem::take(&mut f.children[only]);
                        let survivor = if let Node::Hash(h) = survivor {
                            self.resolve(&h, key, depth + 1)?
                        } else {
                            survivor
                        };
                        let collapsed = match survivor {
                            Node::Short(c) => Node::short(
                                Nibbles(vec![only as u8]).join(&c.key),
                                *c.child,
                                self.generation,
                            ),
                            other => {
                                Node::short(Nibbles(vec![only as u8]), other, self.generation)
                            }
                        };
                        Ok((collapsed, true))
                    }

                    _ => {
                        f.flags = NodeFlags::dirty(self.generation);
                        Ok((Node::Full(f), true))
                    }
                }
            }
        }
    }

    // =========================================================================
    // HASHING / COMMIT
    // =========================================================================

    /// Hash the dirty frontier without persisting anything.
    pub fn root_hash(&mut self) -> Hash {
        let gen = self.generation;
        match &mut self.root {
            Node::Null => empty_trie_root(),
            Node::Hash(h) => *h,
            node => {
                let enc = node_encoding(node, &mut None, gen);
                blake2b256(&enc)
            }
        }
    }

    /// Hash the dirty frontier, stage every node that reached the hash
    /// threshold into `batch`, record the best root under the zero key,
    /// and advance the cache generation. The caller flushes the batch
    /// through `TrieStore::batch_put`; nothing is written here.
    pub fn commit(&mut self, batch: &mut Batch) -> Result<Hash, TrieError> {
        let gen = self.generation;

        let root_hash = match &mut self.root {
            Node::Null => empty_trie_root(),
            Node::Hash(h) => *h,
            node => {
                let enc = node_encoding(node, &mut Some(&mut *batch), gen);
                let hash = blake2b256(&enc);
                batch.put(hash, enc);
                match node {
                    Node::Short(s) => s.flags = NodeFlags::clean(Some(hash), gen),
                    Node::Full(f) => f.flags = NodeFlags::clean(Some(hash), gen),
                    _ => {}
                }
                hash
            }
        };

        batch.put(ZERO_HASH, root_hash.to_vec());
        self.committed_root = Some(root_hash);
        self.generation = self.generation.wrapping_add(1);

        tracing::debug!(
            "[nm-02] committed root {} ({} staged writes)",
            hex::encode(root_hash),
            batch.len()
        );

        Ok(root_hash)
    }

    /// Collapse clean subtrees whose generation lags the current one by
    /// more than the configured limit back into HASH pointers.
    pub fn evict(&mut self) {
        let gen = self.generation;
        let limit = self.config.cache_generations;
        evict_node(&mut self.root, gen, limit);
    }

    // =========================================================================
    // PROOFS
    // =========================================================================

    /// Collect the stored node encodings along the path to `key`, or to
    /// the divergence point proving its absence.
    ///
    /// Proofs are drawn from the committed structure: generate them
    /// after `commit`, when every standalone node on the path is
    /// resolvable through the store.
    pub fn prove(&mut self, key: &[u8]) -> Result<Proof, TrieError> {
        self.check_key(key)?;
        let nib = Nibbles::from_key(key);
        let mut proof = Proof::default();

        if self.root.is_null() {
            // The empty root proves every absence by itself.
            return Ok(proof);
        }

        let mut enc = if let Node::Hash(h) = &self.root {
            let h = *h;
            self.fetch(&h, key, 0)?
        } else {
            let gen = self.generation;
            node_encoding(&mut self.root, &mut None, gen)
        };

        let mut depth = 0;
        loop {
            let node = decode_node(&enc)?;
            proof.nodes.push(enc);
            match walk_step(&node, &nib, depth)
                .map_err(|e| TrieError::Malformed(e.to_string()))?
            {
                Step::Found(_) | Step::Absent => break,
                Step::Descend { hash, depth: d } => {
                    enc = self.fetch(&hash, key, d)?;
                    depth = d;
                }
            }
        }

        Ok(proof)
    }
}

// =============================================================================
// ENCODING FOLD
// =============================================================================

/// Full encoding of a node, folding children into refs bottom-up. With
/// a batch, nodes at or above the hash threshold are staged for
/// persistence and marked clean; without one, flags are left alone so a
/// later commit still sees the dirty frontier.
fn node_encoding(node: &mut Node, batch: &mut Option<&mut Batch>, gen: u32) -> Vec<u8> {
    match node {
        Node::Null => encode_null(),
        Node::Hash(h) => encode_hash_ref(h),
        Node::Value(v) => encode_value(v),
        Node::Short(s) => {
            let child_ref = node_ref(&mut s.child, batch, gen);
            encode_short(&s.key, &child_ref)
        }
        Node::Full(f) => {
            let mut refs: [Vec<u8>; 17] = std::array::from_fn(|_| Vec::new());
            for (i, child) in f.children.iter_mut().enumerate() {
                refs[i] = node_ref(child, batch, gen);
            }
            encode_full(&refs)
        }
    }
}

/// Reference encoding of a child: a HASH pointer once the encoding
/// reaches the threshold, the inline encoding otherwise.
fn node_ref(node: &mut Node, batch: &mut Option<&mut Batch>, gen: u32) -> Vec<u8> {
    match node {
        Node::Null => return encode_null(),
        Node::Hash(h) => return encode_hash_ref(h),
        Node::Short(s) if !s.flags.dirty => {
            if let Some(h) = s.flags.hash {
                return encode_hash_ref(&h);
            }
        }
        Node::Full(f) if !f.flags.dirty => {
            if let Some(h) = f.flags.hash {
                return encode_hash_ref(&h);
            }
        }
        _ => {}
    }

    let enc = node_encoding(node, batch, gen);
    if enc.len() >= HASH_THRESHOLD {
        let hash = blake2b256(&enc);
        if let Some(staged) = batch.as_deref_mut() {
            staged.put(hash, enc);
            match node {
                Node::Short(s) => s.flags = NodeFlags::clean(Some(hash), gen),
                Node::Full(f) => f.flags = NodeFlags::clean(Some(hash), gen),
                _ => {}
            }
        }
        encode_hash_ref(&hash)
    } else {
        if batch.is_some() {
            match node {
                Node::Short(s) => s.flags = NodeFlags::clean(None, gen),
                Node::Full(f) => f.flags = NodeFlags::clean(None, gen),
                _ => {}
            }
        }
        enc
    }
}

fn evict_node(node: &mut Node, gen: u32, limit: u32) {
    let collapse = match node {
        Node::Short(s) if !s.flags.dirty => {
            s.flags.hash.filter(|_| gen.wrapping_sub(s.flags.gen) > limit)
        }
        Node::Full(f) if !f.flags.dirty => {
            f.flags.hash.filter(|_| gen.wrapping_sub(f.flags.gen) > limit)
        }
        _ => None,
    };

    if let Some(hash) = collapse {
        *node = Node::Hash(hash);
        return;
    }

    match node {
        Node::Short(s) => evict_node(&mut s.child, gen, limit),
        Node::Full(f) => {
            for child in f.children.iter_mut() {
                evict_node(child, gen, limit);
            }
        }
        _ => {}
    }
}
