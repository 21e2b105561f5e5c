//! Trie node variants and their codec.
//!
//! Five node kinds, each encoded behind a one-byte type tag:
//!
//! | Tag  | Kind  | Payload |
//! |------|-------|---------|
//! | 0x00 | NULL  | none |
//! | 0x01 | HASH  | 32-byte pointer |
//! | 0x02 | SHORT | compact path (u8 length prefix) + child |
//! | 0x03 | FULL  | 17 children, inline |
//! | 0x04 | VALUE | u16 length prefix + payload |
//!
//! Children inside SHORT and FULL encodings are either HASH pointers
//! (the child's encoding reached 32 bytes and lives in the store) or
//! complete inline encodings of small sub-nodes. The hash of a node is
//! the blake2b-256 of its encoding; the empty tree hashes the single
//! NULL tag byte.

use shared_types::{blake2b256, EncodingError, Hash, SliceReader, WriteExt};

use super::errors::TrieError;
use super::nibbles::Nibbles;

pub const NULL_NODE: u8 = 0x00;
pub const HASH_NODE: u8 = 0x01;
pub const SHORT_NODE: u8 = 0x02;
pub const FULL_NODE: u8 = 0x03;
pub const VALUE_NODE: u8 = 0x04;

/// Encodings at or above this size are persisted by hash; smaller ones
/// ride inline in their parent.
pub const HASH_THRESHOLD: usize = 32;

/// Root hash of the empty tree.
pub fn empty_trie_root() -> Hash {
    blake2b256(&[NULL_NODE])
}

// =============================================================================
// FLAGS
// =============================================================================

/// Cache bookkeeping attached to SHORT and FULL nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct NodeFlags {
    /// Hash of the current encoding, when persisted under it.
    pub hash: Option<Hash>,
    /// Commit generation that last touched this node.
    pub gen: u32,
    /// Encoding changed since the last commit.
    pub dirty: bool,
}

impl NodeFlags {
    /// Flags for a freshly built node.
    pub fn dirty(gen: u32) -> Self {
        Self {
            hash: None,
            gen,
            dirty: true,
        }
    }

    /// Flags for a committed or resolved node.
    pub fn clean(hash: Option<Hash>, gen: u32) -> Self {
        Self {
            hash,
            gen,
            dirty: false,
        }
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Path-compressed prefix plus a single child.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortNode {
    pub key: Nibbles,
    pub child: Box<Node>,
    pub flags: NodeFlags,
}

/// 17-way branch: one slot per nibble plus the terminal value slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FullNode {
    pub children: [Node; 17],
    pub flags: NodeFlags,
}

impl Default for FullNode {
    fn default() -> Self {
        Self {
            children: std::array::from_fn(|_| Node::Null),
            flags: NodeFlags::default(),
        }
    }
}

/// A node in the authenticated name trie.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Node {
    /// Empty tree or empty branch slot.
    #[default]
    Null,
    /// Pointer to a persisted node, resolved lazily.
    Hash(Hash),
    /// Path compression.
    Short(ShortNode),
    /// Branch.
    Full(Box<FullNode>),
    /// Byte payload.
    Value(Vec<u8>),
}

impl Node {
    /// Build a dirty SHORT node.
    pub fn short(key: Nibbles, child: Node, gen: u32) -> Self {
        Node::Short(ShortNode {
            key,
            child: Box::new(child),
            flags: NodeFlags::dirty(gen),
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

pub(crate) fn encode_null() -> Vec<u8> {
    vec![NULL_NODE]
}

pub(crate) fn encode_hash_ref(hash: &Hash) -> Vec<u8> {
    let mut buf = Vec::with_capacity(33);
    buf.put_u8(HASH_NODE);
    buf.put_bytes(hash);
    buf
}

pub(crate) fn encode_value(value: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(3 + value.len());
    buf.put_u8(VALUE_NODE);
    buf.put_u16(value.len() as u16);
    buf.put_bytes(value);
    buf
}

pub(crate) fn encode_short(key: &Nibbles, child_ref: &[u8]) -> Vec<u8> {
    let compact = key.encode_compact();
    let mut buf = Vec::with_capacity(2 + compact.len() + child_ref.len());
    buf.put_u8(SHORT_NODE);
    buf.put_u8(compact.len() as u8);
    buf.put_bytes(&compact);
    buf.put_bytes(child_ref);
    buf
}

pub(crate) fn encode_full(child_refs: &[Vec<u8>; 17]) -> Vec<u8> {
    let total: usize = child_refs.iter().map(|r| r.len()).sum();
    let mut buf = Vec::with_capacity(1 + total);
    buf.put_u8(FULL_NODE);
    for child in child_refs {
        buf.put_bytes(child);
    }
    buf
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode a stored node encoding, rejecting trailing bytes. Inline
/// children decode recursively; HASH pointers stay as `Node::Hash`.
pub fn decode_node(bytes: &[u8]) -> Result<Node, TrieError> {
    let mut r = SliceReader::new(bytes);
    let node = read_node(&mut r)?;
    r.expect_end().map_err(TrieError::Codec)?;
    Ok(node)
}

fn read_node(r: &mut SliceReader<'_>) -> Result<Node, TrieError> {
    let tag = r.read_u8().map_err(TrieError::Codec)?;
    match tag {
        NULL_NODE => Ok(Node::Null),

        HASH_NODE => {
            let hash = r.read_hash().map_err(TrieError::Codec)?;
            Ok(Node::Hash(hash))
        }

        SHORT_NODE => {
            let compact_len = r.read_u8().map_err(TrieError::Codec)? as usize;
            let compact = r.read_bytes(compact_len).map_err(TrieError::Codec)?;
            let key = Nibbles::decode_compact(compact).map_err(TrieError::Codec)?;
            let child = read_node(r)?;
            if child.is_null() {
                return Err(TrieError::Malformed("short node with null child".into()));
            }
            Ok(Node::Short(ShortNode {
                key,
                child: Box::new(child),
                flags: NodeFlags::clean(None, 0),
            }))
        }

        FULL_NODE => {
            let mut full = FullNode::default();
            for slot in full.children.iter_mut() {
                *slot = read_node(r)?;
            }
            full.flags = NodeFlags::clean(None, 0);
            Ok(Node::Full(Box::new(full)))
        }

        VALUE_NODE => {
            let len = r.read_u16().map_err(TrieError::Codec)? as usize;
            let value = r.read_bytes(len).map_err(TrieError::Codec)?.to_vec();
            Ok(Node::Value(value))
        }

        other => Err(TrieError::Codec(EncodingError::InvalidTag(other))),
    }
}
