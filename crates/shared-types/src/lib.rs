//! # shared-types
//!
//! Shared consensus primitives for Nomen-Chain.
//!
//! Every other crate in the workspace builds on the types defined here:
//!
//! - `digest`: blake2b helpers and the fixed-width hash aliases
//! - `encoding`: the little-endian wire cursor and varint codec
//! - `outpoint`: transaction output references
//! - `covenant`: the name-covenant taxonomy and its mempool categories
//! - `network`: consensus phase lengths
//! - `errors`: wire decoding errors
//!
//! The byte layouts implemented on top of these helpers are consensus:
//! changing them forks the chain.

pub mod covenant;
pub mod digest;
pub mod encoding;
pub mod errors;
pub mod network;
pub mod outpoint;

pub use covenant::*;
pub use digest::*;
pub use encoding::*;
pub use errors::*;
pub use network::*;
pub use outpoint::*;

/// Maximum length of a raw name (a DNS label).
pub const MAX_NAME_SIZE: usize = 63;

/// Maximum length of the resource payload committed by a name.
pub const MAX_RECORD_DATA_SIZE: usize = 512;

/// Maximum encoded size of a name record.
///
/// 1 + 63 (name) + 2 + 512 (data) + 4 + 4 + 2 (fixed part) plus the
/// optional groups at their widest: owner 32 + 9, three varints at 9
/// bytes each, three u32 stamps and a varint counter.
pub const MAX_NAMESTATE_SIZE: usize = 668;
