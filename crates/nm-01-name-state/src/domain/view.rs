//! Lazily-populated working set for one block.
//!
//! The first touch of a name pulls its record out of the backing store
//! (or constructs a null record); later touches hit the map. Records in
//! the view are mutation-aware: their setters feed the deltas that
//! become the block's undo bundle, in first-touch order.
//!
//! The view is not thread-safe. The host serializes block processing
//! through its chain lock.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use shared_types::NameHash;

use crate::ports::NameStore;

use super::errors::NameStateError;
use super::namestate::NameState;
use super::undo::NameUndo;

/// In-memory map from name hash to record, with first-touch ordering.
#[derive(Debug, Default)]
pub struct NameView {
    names: HashMap<NameHash, NameState>,
    order: Vec<NameHash>,
}

impl NameView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of names touched so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Look at a record already in the view.
    pub fn get(&self, name_hash: &NameHash) -> Option<&NameState> {
        self.names.get(name_hash)
    }

    /// Fetch a record for mutation, loading it through the store on
    /// first touch. Never-seen names yield a null record keyed by
    /// `name_hash`.
    pub fn get_name_state<S: NameStore>(
        &mut self,
        store: &S,
        name_hash: &NameHash,
    ) -> Result<&mut NameState, NameStateError> {
        match self.names.entry(*name_hash) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let record = store
                    .get_name_state(name_hash)?
                    .unwrap_or_else(|| NameState::open(*name_hash));
                self.order.push(*name_hash);
                Ok(entry.insert(record))
            }
        }
    }

    /// Seed the view with an already-loaded record.
    pub fn insert(&mut self, record: NameState) {
        let hash = *record.name_hash();
        if let Entry::Vacant(entry) = self.names.entry(hash) {
            self.order.push(hash);
            entry.insert(record);
        }
    }

    /// Records in first-touch order.
    pub fn iter(&self) -> impl Iterator<Item = &NameState> {
        self.order.iter().filter_map(|hash| self.names.get(hash))
    }

    /// Records whose state changed since load, in first-touch order.
    pub fn dirty(&self) -> impl Iterator<Item = &NameState> {
        self.iter().filter(|ns| ns.has_delta())
    }

    /// Collect the block's undo bundle: one delta per dirty record, in
    /// first-touch order.
    pub fn to_name_undo(&self) -> NameUndo {
        let mut undo = NameUndo::new();
        for ns in self.dirty() {
            if let Some(delta) = ns.delta() {
                undo.names.push((*ns.name_hash(), delta.clone()));
            }
        }
        undo
    }
}
