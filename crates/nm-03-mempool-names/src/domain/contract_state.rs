//! Reverse indices over in-flight name transactions and the
//! phase-boundary invalidation query.

use std::collections::{HashMap, HashSet};

use nm_01_name_state::{NamePhase, NameState, NameStore};
use shared_types::{Covenant, CovenantCategory, Hash, NameHash, NetworkParams};

use super::errors::ContractError;

/// Mempool name-tracking configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContractConfig {
    /// Evict every transaction touching a weakly-claimed name.
    pub hardened: bool,
}

/// One name reference carried by an in-flight transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameRef {
    pub covenant: Covenant,
    pub name_hash: NameHash,
}

impl NameRef {
    pub fn new(covenant: Covenant, name_hash: NameHash) -> Self {
        Self {
            covenant,
            name_hash,
        }
    }
}

/// Reverse index from watched names to in-flight transaction hashes,
/// grouped by covenant category, plus a shadow view of each watched
/// name's on-chain record.
#[derive(Debug)]
pub struct ContractState {
    params: NetworkParams,
    config: ContractConfig,

    /// How many tracked references point at each name.
    refs: HashMap<NameHash, usize>,

    /// OPEN transactions per name.
    opens: HashMap<NameHash, HashSet<Hash>>,
    /// BID transactions per name.
    bids: HashMap<NameHash, HashSet<Hash>>,
    /// REVEAL and CLAIM transactions per name.
    reveals: HashMap<NameHash, HashSet<Hash>>,
    /// Update-class transactions per name.
    updates: HashMap<NameHash, HashSet<Hash>>,

    /// On-chain records of watched names, data stripped.
    states: HashMap<NameHash, NameState>,
}

impl ContractState {
    pub fn new(params: NetworkParams) -> Self {
        Self::with_config(params, ContractConfig::default())
    }

    pub fn with_config(params: NetworkParams, config: ContractConfig) -> Self {
        Self {
            params,
            config,
            refs: HashMap::new(),
            opens: HashMap::new(),
            bids: HashMap::new(),
            reveals: HashMap::new(),
            updates: HashMap::new(),
            states: HashMap::new(),
        }
    }

    /// Whether the hardened weak-name sweep is active.
    pub fn is_hardened(&self) -> bool {
        self.config.hardened
    }

    /// Number of watched names.
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// True while any transaction references the name.
    pub fn is_tracked(&self, name_hash: &NameHash) -> bool {
        self.refs.contains_key(name_hash)
    }

    /// Reference count for a name.
    pub fn reference_count(&self, name_hash: &NameHash) -> usize {
        self.refs.get(name_hash).copied().unwrap_or(0)
    }

    /// The cached on-chain record of a watched name.
    pub fn get_state(&self, name_hash: &NameHash) -> Option<&NameState> {
        self.states.get(name_hash)
    }

    fn index_mut(&mut self, category: CovenantCategory) -> &mut HashMap<NameHash, HashSet<Hash>> {
        match category {
            CovenantCategory::Opens => &mut self.opens,
            CovenantCategory::Bids => &mut self.bids,
            CovenantCategory::Reveals => &mut self.reveals,
            CovenantCategory::Updates => &mut self.updates,
        }
    }

    fn index(&self, category: CovenantCategory) -> &HashMap<NameHash, HashSet<Hash>> {
        match category {
            CovenantCategory::Opens => &self.opens,
            CovenantCategory::Bids => &self.bids,
            CovenantCategory::Reveals => &self.reveals,
            CovenantCategory::Updates => &self.updates,
        }
    }

    /// Transactions of `category` watching `name_hash`.
    pub fn category_txs(&self, category: CovenantCategory, name_hash: &NameHash) -> usize {
        self.index(category)
            .get(name_hash)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    // =========================================================================
    // TRACK / UNTRACK
    // =========================================================================

    /// Register an accepted transaction's name references. The first
    /// reference to a name caches its on-chain record (data stripped)
    /// out of `store`.
    pub fn track<S: NameStore>(
        &mut self,
        tx_hash: Hash,
        refs: &[NameRef],
        store: &S,
    ) -> Result<(), ContractError> {
        for name_ref in refs {
            let Some(category) = name_ref.covenant.category() else {
                continue;
            };

            self.index_mut(category)
                .entry(name_ref.name_hash)
                .or_default()
                .insert(tx_hash);

            *self.refs.entry(name_ref.name_hash).or_insert(0) += 1;

            if !self.states.contains_key(&name_ref.name_hash) {
                let record = store
                    .get_name_state(&name_ref.name_hash)?
                    .unwrap_or_else(|| NameState::open(name_ref.name_hash));
                self.states.insert(name_ref.name_hash, record.to_stub());
            }
        }

        tracing::debug!(
            "[nm-03] tracking tx with {} name refs ({} names watched)",
            refs.len(),
            self.refs.len()
        );

        Ok(())
    }

    /// Drop a removed transaction's name references. A name's cached
    /// record goes away when its last reference does. Unknown
    /// references are ignored.
    pub fn untrack(&mut self, tx_hash: &Hash, refs: &[NameRef]) {
        for name_ref in refs {
            let Some(category) = name_ref.covenant.category() else {
                continue;
            };

            let index = self.index_mut(category);
            if let Some(set) = index.get_mut(&name_ref.name_hash) {
                set.remove(tx_hash);
                if set.is_empty() {
                    index.remove(&name_ref.name_hash);
                }
            }

            if let Some(count) = self.refs.get_mut(&name_ref.name_hash) {
                *count -= 1;
                if *count == 0 {
                    self.refs.remove(&name_ref.name_hash);
                    self.states.remove(&name_ref.name_hash);
                }
            }
        }
    }

    /// Refresh a watched name's shadow record after a block changed it.
    pub fn refresh<S: NameStore>(
        &mut self,
        name_hash: &NameHash,
        store: &S,
    ) -> Result<(), ContractError> {
        if self.is_tracked(name_hash) {
            let record = store
                .get_name_state(name_hash)?
                .unwrap_or_else(|| NameState::open(*name_hash));
            self.states.insert(*name_hash, record.to_stub());
        }
        Ok(())
    }

    // =========================================================================
    // INVALIDATION
    // =========================================================================

    /// Transactions the block at `next_height` would make consensus-
    /// invalid. The result is a superset of the transactions that break:
    ///
    /// - an expired (or revoked) record kills its update-class txs
    /// - OPENING kills update-class txs
    /// - BIDDING kills OPENs
    /// - REVEAL kills BIDs
    /// - CLOSED kills REVEALs
    /// - hardened mode additionally kills everything touching a weak
    ///   name
    pub fn invalidate(&self, next_height: u32) -> HashSet<Hash> {
        let mut evicted = HashSet::new();

        for (name_hash, record) in &self.states {
            if self.config.hardened && record.is_weak() {
                self.collect(&self.opens, name_hash, &mut evicted);
                self.collect(&self.bids, name_hash, &mut evicted);
                self.collect(&self.reveals, name_hash, &mut evicted);
                self.collect(&self.updates, name_hash, &mut evicted);
                continue;
            }

            if record.is_expired(next_height, &self.params) {
                self.collect(&self.updates, name_hash, &mut evicted);
            }

            match record.phase(next_height, &self.params) {
                NamePhase::Opening => {
                    self.collect(&self.updates, name_hash, &mut evicted);
                }
                NamePhase::Bidding => {
                    self.collect(&self.opens, name_hash, &mut evicted);
                }
                NamePhase::Reveal => {
                    self.collect(&self.bids, name_hash, &mut evicted);
                }
                NamePhase::Closed => {
                    self.collect(&self.reveals, name_hash, &mut evicted);
                }
                NamePhase::Revoked => {
                    // Nothing operates on a revoked name.
                    self.collect(&self.updates, name_hash, &mut evicted);
                }
                NamePhase::Locked => {}
            }
        }

        evicted
    }

    fn collect(
        &self,
        index: &HashMap<NameHash, HashSet<Hash>>,
        name_hash: &NameHash,
        out: &mut HashSet<Hash>,
    ) {
        if let Some(set) = index.get(name_hash) {
            out.extend(set.iter().copied());
        }
    }
}
