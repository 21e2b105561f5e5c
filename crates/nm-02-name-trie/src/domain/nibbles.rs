//! Half-byte path representation.
//!
//! Keys are expanded into nibbles (0-15) with a terminal sentinel (16)
//! appended, so a leaf path is distinguishable from a branch prefix and
//! the value of a fixed-width key always lands in a FULL node's 17th
//! slot. SHORT nodes persist their path in the compact form: a 2-bit
//! header (terminal? odd?) followed by two nibbles per byte.

use shared_types::EncodingError;

/// The terminal sentinel appended to every complete key path.
pub const TERMINAL: u8 = 0x10;

/// Nibble path for trie traversal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nibbles(pub Vec<u8>);

impl Nibbles {
    /// Expand a fixed-width key into nibbles plus the terminal sentinel.
    pub fn from_key(key: &[u8]) -> Self {
        let mut nibbles = Vec::with_capacity(key.len() * 2 + 1);
        for byte in key {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0F);
        }
        nibbles.push(TERMINAL);
        Nibbles(nibbles)
    }

    /// Nibbles starting at `start`.
    pub fn slice(&self, start: usize) -> Self {
        Nibbles(self.0[start..].to_vec())
    }

    /// Nibbles in `start..end`.
    pub fn slice_range(&self, start: usize, end: usize) -> Self {
        Nibbles(self.0[start..end].to_vec())
    }

    /// Length of the shared prefix with `other`.
    pub fn common_prefix_len(&self, other: &Nibbles) -> usize {
        self.0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// True when `self` is a prefix of the tail of `other` at `start`.
    pub fn matches_at(&self, other: &Nibbles, start: usize) -> bool {
        other.0.len() >= start + self.0.len() && other.0[start..start + self.0.len()] == self.0[..]
    }

    /// Concatenation `self || other`.
    pub fn join(&self, other: &Nibbles) -> Self {
        let mut out = Vec::with_capacity(self.0.len() + other.0.len());
        out.extend_from_slice(&self.0);
        out.extend_from_slice(&other.0);
        Nibbles(out)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Nibble at `index`.
    pub fn at(&self, index: usize) -> u8 {
        self.0[index]
    }

    /// Pack into the compact form: header flags (terminal, odd) in the
    /// top nibble of the first byte, path nibbles two per byte after.
    pub fn encode_compact(&self) -> Vec<u8> {
        let mut nibs = self.0.as_slice();
        let terminal = nibs.last() == Some(&TERMINAL);
        if terminal {
            nibs = &nibs[..nibs.len() - 1];
        }

        let odd = nibs.len() % 2 == 1;
        let flags = ((terminal as u8) << 1) | odd as u8;

        let mut out = Vec::with_capacity(nibs.len() / 2 + 1);
        if odd {
            out.push((flags << 4) | nibs[0]);
            nibs = &nibs[1..];
        } else {
            out.push(flags << 4);
        }
        for pair in nibs.chunks(2) {
            out.push((pair[0] << 4) | pair[1]);
        }
        out
    }

    /// Unpack the compact form.
    pub fn decode_compact(bytes: &[u8]) -> Result<Self, EncodingError> {
        let first = *bytes.first().ok_or(EncodingError::UnexpectedEof {
            wanted: 1,
            remaining: 0,
        })?;

        let header = first >> 4;
        if header > 0b11 {
            return Err(EncodingError::InvalidTag(first));
        }
        let odd = header & 0b01 != 0;
        let terminal = header & 0b10 != 0;

        let mut nibbles = Vec::with_capacity(bytes.len() * 2 + 1);
        if odd {
            nibbles.push(first & 0x0F);
        } else if first & 0x0F != 0 {
            return Err(EncodingError::NonCanonical);
        }
        for &byte in &bytes[1..] {
            nibbles.push(byte >> 4);
            nibbles.push(byte & 0x0F);
        }
        if terminal {
            nibbles.push(TERMINAL);
        }

        Ok(Nibbles(nibbles))
    }
}
