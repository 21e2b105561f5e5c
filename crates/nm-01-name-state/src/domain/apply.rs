//! Covenant application: the deterministic block function.
//!
//! `BlockApplier::connect` walks a block's name-bearing outputs in
//! transaction order, then output order, resolves each referenced name
//! through the view, checks phase admissibility, and mutates the record
//! through its delta-capturing setters. The returned undo bundle,
//! replayed in reverse by `disconnect`, restores every touched record
//! byte-for-byte.
//!
//! Admissibility failures abort the connect; the view is discarded by
//! the host, so no partial state survives.

use shared_types::{
    hash_name, Covenant, NameHash, NetworkParams, Outpoint, MAX_NAME_SIZE, MAX_RECORD_DATA_SIZE,
};

use super::errors::NameStateError;
use super::namestate::NamePhase;
use super::undo::NameUndo;
use super::view::NameView;
use crate::ports::NameStore;

// =============================================================================
// OPERATIONS
// =============================================================================

/// A name covenant together with its operands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameOperation {
    /// Announce an auction. Carries the name preimage.
    Open { name: Vec<u8> },
    /// Sealed bid. The bid itself lives in the output; the record does
    /// not change until reveal.
    Bid,
    /// Reveal a bid of `value`.
    Reveal { value: u64 },
    /// Claim a reserved name.
    Claim { name: Vec<u8>, weak: bool },
    /// Commit resource data for the first time.
    Register { data: Vec<u8> },
    /// Replace resource data.
    Update { data: Vec<u8> },
    /// Renew ownership.
    Renew,
    /// Start an ownership transfer.
    Transfer,
    /// Complete a matured transfer.
    Finalize,
    /// Revoke the name irreversibly.
    Revoke,
}

impl NameOperation {
    /// The covenant type this operation carries.
    pub fn covenant(&self) -> Covenant {
        match self {
            NameOperation::Open { .. } => Covenant::Open,
            NameOperation::Bid => Covenant::Bid,
            NameOperation::Reveal { .. } => Covenant::Reveal,
            NameOperation::Claim { .. } => Covenant::Claim,
            NameOperation::Register { .. } => Covenant::Register,
            NameOperation::Update { .. } => Covenant::Update,
            NameOperation::Renew => Covenant::Renew,
            NameOperation::Transfer => Covenant::Transfer,
            NameOperation::Finalize => Covenant::Finalize,
            NameOperation::Revoke => Covenant::Revoke,
        }
    }
}

/// One name-bearing output of a block, in consensus order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameOutput {
    /// The name this output operates on.
    pub name_hash: NameHash,
    /// The output being created; becomes the owner outpoint for
    /// owner-class covenants.
    pub outpoint: Outpoint,
    /// Covenant and operands.
    pub operation: NameOperation,
}

// =============================================================================
// BLOCK APPLIER
// =============================================================================

/// Applies one block's name operations against a view.
pub struct BlockApplier<'a, S: NameStore> {
    store: &'a S,
    params: NetworkParams,
    height: u32,
}

impl<'a, S: NameStore> BlockApplier<'a, S> {
    /// Applier for the block at `height`.
    pub fn new(store: &'a S, params: NetworkParams, height: u32) -> Self {
        Self {
            store,
            params,
            height,
        }
    }

    /// The height this applier connects at.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Apply every output in order and collect the undo bundle.
    pub fn connect(
        &self,
        view: &mut NameView,
        outputs: &[NameOutput],
    ) -> Result<NameUndo, NameStateError> {
        tracing::debug!(
            "[nm-01] connecting {} name outputs at height {}",
            outputs.len(),
            self.height
        );

        for output in outputs {
            self.apply_output(view, output)?;
        }

        Ok(view.to_name_undo())
    }

    /// Replay an undo bundle in reverse, restoring pre-block records.
    ///
    /// Restored records carry no delta; a host persisting a disconnect
    /// writes every record in the view, not just the dirty ones.
    pub fn disconnect(&self, view: &mut NameView, undo: &NameUndo) -> Result<(), NameStateError> {
        tracing::debug!(
            "[nm-01] disconnecting {} name deltas at height {}",
            undo.len(),
            self.height
        );

        for (name_hash, delta) in undo.names.iter().rev() {
            let ns = view.get_name_state(self.store, name_hash)?;
            ns.apply_delta(delta);
        }

        Ok(())
    }

    fn apply_output(
        &self,
        view: &mut NameView,
        output: &NameOutput,
    ) -> Result<(), NameStateError> {
        let height = self.height;
        let params = self.params;

        let ns = view.get_name_state(self.store, &output.name_hash)?;

        // Expiry materializes on touch; for a revoked or lapsed name
        // this reset is part of the block's delta like any other change.
        if !ns.is_null() {
            ns.maybe_expire(height, &params);
        }

        let phase = ns.phase(height, &params);
        let reject = |covenant: Covenant| NameStateError::InvalidCovenant {
            covenant,
            phase,
            name_hash: output.name_hash,
        };

        match &output.operation {
            NameOperation::Open { name } => {
                check_name(name, &output.name_hash)?;
                if !ns.is_null() && !ns.is_expired_flag() {
                    return Err(reject(Covenant::Open));
                }
                ns.set_name(name);
                ns.set_height(height);
                ns.set_renewal(height);
                ns.set_expired(false);
            }

            NameOperation::Bid => {
                if phase != NamePhase::Bidding {
                    return Err(reject(Covenant::Bid));
                }
            }

            NameOperation::Reveal { value } => {
                if phase != NamePhase::Reveal {
                    return Err(reject(Covenant::Reveal));
                }
                if *value > ns.highest() {
                    // New leader: the old top bid becomes the price.
                    let prev_highest = ns.highest();
                    ns.set_value(prev_highest);
                    ns.set_highest(*value);
                    ns.set_owner(output.outpoint);
                } else if *value > ns.value() {
                    ns.set_value(*value);
                }
            }

            NameOperation::Claim { name, weak } => {
                if height >= self.params.claim_period {
                    return Err(NameStateError::ClaimPeriodOver(height));
                }
                check_name(name, &output.name_hash)?;
                if !ns.is_null() && !ns.is_expired_flag() {
                    return Err(reject(Covenant::Claim));
                }
                ns.set_name(name);
                ns.set_height(height);
                ns.set_renewal(height);
                ns.set_claimed(height);
                ns.set_weak(*weak);
                ns.set_owner(output.outpoint);
                ns.set_expired(false);
            }

            NameOperation::Register { data } => {
                if phase != NamePhase::Closed {
                    return Err(reject(Covenant::Register));
                }
                if ns.is_registered() {
                    return Err(reject(Covenant::Register));
                }
                check_data(data)?;
                ns.set_registered(true);
                ns.set_owner(output.outpoint);
                ns.set_data(data.clone());
                ns.set_renewal(height);
            }

            NameOperation::Update { data } => {
                if phase != NamePhase::Closed {
                    return Err(reject(Covenant::Update));
                }
                if !ns.is_registered() {
                    return Err(NameStateError::NotRegistered(output.name_hash));
                }
                if ns.is_weak_locked(height, &params) {
                    return Err(NameStateError::WeakLockup(output.name_hash));
                }
                check_data(data)?;
                ns.set_data(data.clone());
                ns.set_owner(output.outpoint);
                // An update supersedes a pending transfer.
                if ns.transfer() != 0 {
                    ns.set_transfer(0);
                }
            }

            NameOperation::Renew => {
                if phase != NamePhase::Closed {
                    return Err(reject(Covenant::Renew));
                }
                if !ns.is_registered() {
                    return Err(NameStateError::NotRegistered(output.name_hash));
                }
                let renewals = ns.renewals();
                ns.set_renewal(height);
                ns.set_renewals(renewals + 1);
                ns.set_owner(output.outpoint);
            }

            NameOperation::Transfer => {
                if phase != NamePhase::Closed {
                    return Err(reject(Covenant::Transfer));
                }
                if !ns.is_registered() {
                    return Err(NameStateError::NotRegistered(output.name_hash));
                }
                if ns.transfer() != 0 {
                    return Err(NameStateError::TransferPending(output.name_hash));
                }
                if ns.is_weak_locked(height, &params) {
                    return Err(NameStateError::WeakLockup(output.name_hash));
                }
                ns.set_transfer(height);
                ns.set_owner(output.outpoint);
            }

            NameOperation::Finalize => {
                if phase != NamePhase::Closed {
                    return Err(reject(Covenant::Finalize));
                }
                let started = ns.transfer();
                if started == 0 {
                    return Err(reject(Covenant::Finalize));
                }
                if (height as u64) < started as u64 + params.transfer_lockup as u64 {
                    return Err(NameStateError::TransferImmature { started, height });
                }
                let renewals = ns.renewals();
                ns.set_owner(output.outpoint);
                ns.set_transfer(0);
                ns.set_renewal(height);
                ns.set_renewals(renewals + 1);
            }

            NameOperation::Revoke => {
                if phase != NamePhase::Closed {
                    return Err(reject(Covenant::Revoke));
                }
                if !ns.is_registered() {
                    return Err(NameStateError::NotRegistered(output.name_hash));
                }
                ns.set_revoked(height);
                ns.set_transfer(0);
                ns.set_data(Vec::new());
            }
        }

        Ok(())
    }
}

fn check_name(name: &[u8], name_hash: &NameHash) -> Result<(), NameStateError> {
    if name.len() > MAX_NAME_SIZE {
        return Err(NameStateError::NameOversized(name.len()));
    }
    if &hash_name(name) != name_hash {
        return Err(NameStateError::NameMismatch(*name_hash));
    }
    Ok(())
}

fn check_data(data: &[u8]) -> Result<(), NameStateError> {
    if data.len() > MAX_RECORD_DATA_SIZE {
        return Err(NameStateError::DataOversized(data.len()));
    }
    Ok(())
}
