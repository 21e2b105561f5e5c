//! Per-block undo bundle.
//!
//! One `(nameHash, delta)` pair per name the block mutated, in the order
//! the names were first touched. Disconnecting a block replays the pairs
//! in reverse.

use shared_types::{EncodingError, NameHash, SliceReader, WriteExt};

use super::delta::NameDelta;

/// Ordered pre-block deltas for every name a block touched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameUndo {
    /// First-touch ordered `(nameHash, delta)` pairs.
    pub names: Vec<(NameHash, NameDelta)>,
}

impl NameUndo {
    /// Bundle with no entries (a block that touched no names).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Serialize as `u32 count | (hash32 || delta)*`.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.put_u32(self.names.len() as u32);
        for (hash, delta) in &self.names {
            buf.put_bytes(hash);
            buf.put_bytes(&delta.encode());
        }
        buf
    }

    /// Decode a bundle, rejecting trailing bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        let mut r = SliceReader::new(bytes);
        let count = r.read_u32()? as usize;

        let mut names = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let hash = r.read_hash()?;
            let delta = NameDelta::read(&mut r)?;
            names.push((hash, delta));
        }

        r.expect_end()?;
        Ok(Self { names })
    }
}
