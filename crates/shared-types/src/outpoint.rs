//! Transaction output references.

use crate::digest::Hash;
use crate::encoding::{varint_size, SliceReader, WriteExt};
use crate::errors::EncodingError;

/// Reference to a transaction output: `hash(32) || varint(index)` on the
/// wire.
///
/// The null outpoint (all-zero hash, index `0xffffffff`) marks a name
/// with no established owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Outpoint {
    /// Transaction hash.
    pub hash: Hash,
    /// Output index within the transaction.
    pub index: u32,
}

impl Outpoint {
    /// Build an outpoint from its parts.
    pub fn new(hash: Hash, index: u32) -> Self {
        Self { hash, index }
    }

    /// The null outpoint.
    pub fn null() -> Self {
        Self {
            hash: [0u8; 32],
            index: u32::MAX,
        }
    }

    /// True for the null outpoint.
    pub fn is_null(&self) -> bool {
        self.index == u32::MAX && self.hash == [0u8; 32]
    }

    /// Encoded wire size.
    pub fn size(&self) -> usize {
        32 + varint_size(self.index as u64)
    }

    /// Append the wire form to `buf`.
    pub fn write(&self, buf: &mut Vec<u8>) {
        buf.put_bytes(&self.hash);
        buf.put_varint(self.index as u64);
    }

    /// Read an outpoint from the cursor.
    pub fn read(r: &mut SliceReader<'_>) -> Result<Self, EncodingError> {
        let hash = r.read_hash()?;
        let index = r.read_varint()?;
        if index > u32::MAX as u64 {
            return Err(EncodingError::Oversized {
                size: index as usize,
                max: u32::MAX as usize,
            });
        }
        Ok(Self {
            hash,
            index: index as u32,
        })
    }
}
