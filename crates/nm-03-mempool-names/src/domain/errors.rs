//! Mempool tracking error types.
//!
//! Errors here surface as transaction rejects at the mempool boundary,
//! never as chain aborts.

use nm_01_name_state::NameStateError;
use thiserror::Error;

/// Errors raised while tracking mempool name references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    /// Loading a watched name's on-chain record failed.
    #[error("name state error: {0}")]
    State(#[from] NameStateError),
}
