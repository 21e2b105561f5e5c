//! Wire decoding error types.
//!
//! Every consensus codec in the workspace reports failures through
//! `EncodingError`. Decode errors are always fatal to the enclosing
//! operation; there is no partial decode.

use thiserror::Error;

/// Errors raised while reading or validating a consensus byte layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    /// The input ended before the requested field.
    #[error("unexpected end of input: wanted {wanted} bytes, {remaining} remaining")]
    UnexpectedEof { wanted: usize, remaining: usize },

    /// A type or opcode byte has no defined meaning.
    #[error("invalid tag byte: {0:#04x}")]
    InvalidTag(u8),

    /// A length-prefixed field exceeds its consensus bound.
    #[error("field oversized: {size} bytes, maximum {max}")]
    Oversized { size: usize, max: usize },

    /// Input remained after the final field of a fixed layout.
    #[error("trailing bytes after decode: {0}")]
    TrailingBytes(usize),

    /// A varint used a wider form than its value requires.
    #[error("non-canonical varint encoding")]
    NonCanonical,
}
