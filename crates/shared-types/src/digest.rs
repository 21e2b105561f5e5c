//! Blake2b digest helpers.
//!
//! All consensus hashing in Nomen-Chain is blake2b: 256-bit digests for
//! name hashes and trie nodes, 160-bit digests for sub-trie keys.

use blake2::digest::consts::{U20, U32};
use blake2::{Blake2b, Digest};

/// A 256-bit blake2b digest.
pub type Hash = [u8; 32];

/// The canonical key for name-state lookup: `blake2b256(name)`.
pub type NameHash = [u8; 32];

/// A 160-bit blake2b digest, used as the fixed-width sub-trie key.
pub type KeyHash = [u8; 20];

type Blake2b256 = Blake2b<U32>;
type Blake2b160 = Blake2b<U20>;

/// The all-zero hash. Doubles as the KV slot for the best trie root.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Compute a 256-bit blake2b digest.
pub fn blake2b256(data: &[u8]) -> Hash {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Compute a 256-bit blake2b digest over two concatenated slices.
pub fn blake2b256_pair(a: &[u8], b: &[u8]) -> Hash {
    let mut hasher = Blake2b256::new();
    hasher.update(a);
    hasher.update(b);
    hasher.finalize().into()
}

/// Compute a 160-bit blake2b digest.
pub fn blake2b160(data: &[u8]) -> KeyHash {
    let mut hasher = Blake2b160::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash a raw name into its canonical lookup key.
pub fn hash_name(name: &[u8]) -> NameHash {
    blake2b256(name)
}
