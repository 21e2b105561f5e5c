//! Compact proofs of existence and non-existence.
//!
//! A proof is the ordered list of stored node encodings a lookup resolves
//! on its way from the root to a value or to the divergence point that
//! proves absence. Verification is stateless: each node must hash to the
//! pointer that referenced it, and the walk must land on a conclusive
//! result inside the supplied nodes.

use serde::{Deserialize, Serialize};
use shared_types::{blake2b256, varint_size, EncodingError, Hash, SliceReader, WriteExt};

use super::errors::ProofError;
use super::nibbles::Nibbles;
use super::node::{decode_node, empty_trie_root, Node};

/// Ordered stored-node encodings along a lookup path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Node encodings, root first.
    pub nodes: Vec<Vec<u8>>,
}

impl Proof {
    /// Encoded wire size.
    pub fn size(&self) -> usize {
        let mut size = varint_size(self.nodes.len() as u64);
        for node in &self.nodes {
            size += varint_size(node.len() as u64) + node.len();
        }
        size
    }

    /// Serialize as `varint count | (varint len || bytes)*`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.put_varint(self.nodes.len() as u64);
        for node in &self.nodes {
            buf.put_varint(node.len() as u64);
            buf.put_bytes(node);
        }
    }

    /// Read a proof from the cursor.
    pub fn read(r: &mut SliceReader<'_>) -> Result<Self, EncodingError> {
        let count = r.read_varint()? as usize;
        let mut nodes = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            let len = r.read_varint()? as usize;
            nodes.push(r.read_bytes(len)?.to_vec());
        }
        Ok(Self { nodes })
    }
}

/// One traversal step inside decoded proof material.
pub(crate) enum Step {
    /// The key resolves to this value.
    Found(Vec<u8>),
    /// The path diverges; the key is provably absent.
    Absent,
    /// Traversal crossed a HASH pointer at this nibble depth.
    Descend { hash: Hash, depth: usize },
}

/// Walk a decoded node (and its inline children) along `key` starting at
/// `depth`, until a result or the next pointer.
pub(crate) fn walk_step(node: &Node, key: &Nibbles, mut depth: usize) -> Result<Step, ProofError> {
    let mut cur = node;
    loop {
        match cur {
            Node::Null => return Ok(Step::Absent),

            Node::Value(v) => {
                if depth != key.len() {
                    return Err(ProofError::UnexpectedNode);
                }
                return Ok(Step::Found(v.clone()));
            }

            Node::Hash(h) => {
                return Ok(Step::Descend {
                    hash: *h,
                    depth,
                })
            }

            Node::Short(s) => {
                if !s.key.matches_at(key, depth) {
                    return Ok(Step::Absent);
                }
                depth += s.key.len();
                cur = &s.child;
            }

            Node::Full(f) => {
                if depth >= key.len() {
                    return Err(ProofError::UnexpectedNode);
                }
                let idx = key.at(depth) as usize;
                depth += 1;
                cur = &f.children[idx];
            }
        }
    }
}

/// Statelessly verify `proof` for `key` against `root`.
///
/// Returns `Ok(Some(value))` for proven existence, `Ok(None)` for proven
/// absence, and a `ProofError` for anything that does not check out.
pub fn verify(root: &Hash, key: &[u8], proof: &Proof) -> Result<Option<Vec<u8>>, ProofError> {
    let nib = Nibbles::from_key(key);

    if proof.nodes.is_empty() {
        // Only the empty tree proves anything with no nodes.
        if *root == empty_trie_root() {
            return Ok(None);
        }
        return Err(ProofError::NoResult);
    }

    let mut expected = *root;
    let mut depth = 0;
    let mut index = 0;

    loop {
        let enc = proof.nodes.get(index).ok_or(ProofError::EarlyEnd)?;
        if blake2b256(enc) != expected {
            return Err(ProofError::HashMismatch);
        }
        let node = decode_node(enc).map_err(|_| ProofError::MalformedNode)?;

        match walk_step(&node, &nib, depth)? {
            Step::Found(value) => {
                if index + 1 != proof.nodes.len() {
                    return Err(ProofError::UnexpectedNode);
                }
                return Ok(Some(value));
            }
            Step::Absent => {
                if index + 1 != proof.nodes.len() {
                    return Err(ProofError::UnexpectedNode);
                }
                return Ok(None);
            }
            Step::Descend { hash, depth: d } => {
                expected = hash;
                depth = d;
                index += 1;
            }
        }
    }
}
