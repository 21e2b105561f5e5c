//! Persistent name-record storage abstraction.

use shared_types::NameHash;

use crate::domain::{NameState, NameStateError};

/// Read access to committed name records.
///
/// Implementations map storage failures into
/// `NameStateError::Store`; a missing record is `Ok(None)`, never an
/// error.
pub trait NameStore: Send + Sync {
    fn get_name_state(&self, name_hash: &NameHash) -> Result<Option<NameState>, NameStateError>;

    fn has_name_state(&self, name_hash: &NameHash) -> Result<bool, NameStateError> {
        Ok(self.get_name_state(name_hash)?.is_some())
    }
}
