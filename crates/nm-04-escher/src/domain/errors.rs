//! Escher policy error types.
//!
//! Any of these rejects the enclosing UPDATE covenant.

use nm_02_name_trie::ProofError;
use shared_types::EncodingError;
use thiserror::Error;

/// Errors raised while decoding or verifying an Escher message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscherError {
    /// Message or data slot exceeds the 512-byte bound.
    #[error("escher payload oversized: {0} bytes")]
    Oversized(usize),

    /// Unknown version byte.
    #[error("unknown escher version: {0:#04x}")]
    InvalidVersion(u8),

    /// Unknown opcode byte.
    #[error("unknown escher opcode: {0:#04x}")]
    InvalidOpcode(u8),

    /// The proposed replacement leaves escher mode.
    #[error("escher mode cannot be exited")]
    ExitMode,

    /// First entry into escher mode must commit the empty sub-trie.
    #[error("escher entry must start from the empty sub-trie root")]
    BadEntryRoot,

    /// The message's root does not match the record's committed root.
    #[error("escher root does not match record data")]
    RootMismatch,

    /// REGISTER for a compound name that already exists.
    #[error("compound name already registered")]
    KeyExists,

    /// UPDATE of a compound name that does not exist.
    #[error("compound name not registered")]
    KeyMissing,

    /// The proven value is not a public key.
    #[error("bound value is not a 32-byte public key")]
    MalformedKey,

    /// The embedded proof failed verification.
    #[error("embedded proof invalid: {0}")]
    Proof(#[from] ProofError),

    /// The embedded proof lacks nodes the simulated insertion needs.
    #[error("proof material incomplete: {0}")]
    IncompleteProof(String),

    /// The simulated insertion does not produce the proposed root.
    #[error("simulated root does not match proposed data")]
    NewRootMismatch,

    /// UPDATE signature failed under the previously bound key.
    #[error("escher signature invalid")]
    BadSignature,

    /// Low-level wire failure.
    #[error("codec failure: {0}")]
    Codec(#[from] EncodingError),
}
