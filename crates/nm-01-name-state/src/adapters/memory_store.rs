//! In-memory implementation of `NameStore` for tests and hosts without
//! their own persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use shared_types::NameHash;

use crate::domain::{NameState, NameStateError, NameView};
use crate::ports::NameStore;

/// HashMap-backed name store.
#[derive(Debug, Default)]
pub struct MemoryNameStore {
    names: RwLock<HashMap<NameHash, NameState>>,
}

impl MemoryNameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn put_name_state(&self, mut record: NameState) {
        // Persisted records are clean; drop any runtime delta.
        record.take_delta();
        let mut names = match self.names.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        names.insert(*record.name_hash(), record);
    }

    /// Persist every dirty record of a committed view.
    pub fn commit_view(&self, view: &NameView) {
        for record in view.dirty() {
            self.put_name_state(record.clone());
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        match self.names.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NameStore for MemoryNameStore {
    fn get_name_state(&self, name_hash: &NameHash) -> Result<Option<NameState>, NameStateError> {
        let names = self
            .names
            .read()
            .map_err(|_| NameStateError::Store("name store lock poisoned".into()))?;
        Ok(names.get(name_hash).cloned())
    }
}
