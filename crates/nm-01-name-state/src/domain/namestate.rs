//! The per-name authoritative record.
//!
//! A `NameState` carries everything consensus knows about one name: the
//! auction timers, the winning output, the committed resource data, and
//! the claim/transfer/revocation side-state. Its phase at any height is a
//! pure function of the record and the network parameters.
//!
//! Mutation goes through setters. Each setter is idempotent for equal
//! values and, on an actual change, captures the prior value into the
//! record's delta exactly once per block, so the per-block undo bundle is
//! a bit-exact inverse of the forward mutations.

use shared_types::{
    hash_name, varint_size, EncodingError, NameHash, NetworkParams, Outpoint, SliceReader,
    WriteExt, MAX_NAMESTATE_SIZE, MAX_NAME_SIZE, MAX_RECORD_DATA_SIZE,
};

use super::delta::NameDelta;

// =============================================================================
// PHASE
// =============================================================================

/// Auction phase of a name at a given height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamePhase {
    /// Auction announced; bids not yet admissible.
    Opening,
    /// Sealed bids admissible.
    Bidding,
    /// Reveals admissible.
    Reveal,
    /// Auction settled; owner operations admissible.
    Closed,
    /// Claimed name inside its lock-up.
    Locked,
    /// Irreversibly revoked.
    Revoked,
}

// =============================================================================
// FIELD MAP BITS (record codec)
// =============================================================================

const FIELD_OWNER: u16 = 1 << 0;
const FIELD_VALUE: u16 = 1 << 1;
const FIELD_HIGHEST: u16 = 1 << 2;
const FIELD_TRANSFER: u16 = 1 << 3;
const FIELD_REVOKED: u16 = 1 << 4;
const FIELD_CLAIMED: u16 = 1 << 5;
const FIELD_RENEWALS: u16 = 1 << 6;
const FIELD_REGISTERED: u16 = 1 << 7;
const FIELD_EXPIRED: u16 = 1 << 8;
const FIELD_WEAK: u16 = 1 << 9;

const FIELD_MASK: u16 = (1 << 10) - 1;

// =============================================================================
// NAME STATE
// =============================================================================

/// Full authoritative state of a single name.
///
/// Fields are private so that every mutation flows through the
/// delta-capturing setters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameState {
    /// DNS label, at most 63 bytes. Empty until the preimage is seen.
    name: Vec<u8>,
    /// Cached `blake2b256(name)` lookup key.
    name_hash: NameHash,
    /// Height the current auction opened at.
    height: u32,
    /// Last renewal height.
    renewal: u32,
    /// Current winning output; null until a reveal confirms.
    owner: Outpoint,
    /// Price the winner pays: the second-highest revealed bid.
    value: u64,
    /// Top revealed bid.
    highest: u64,
    /// Committed resource record, at most 512 bytes.
    data: Vec<u8>,
    /// Height of a pending transfer; 0 means none.
    transfer: u32,
    /// Height the name was revoked; 0 means never.
    revoked: u32,
    /// Height a reserved name was claimed; 0 means none.
    claimed: u32,
    /// Number of successful renewals.
    renewals: u64,
    /// Data has been committed at least once.
    registered: bool,
    /// Reset by expiration this lifetime.
    expired: bool,
    /// Claimed via a weak proof; subject to an extended lock-up.
    weak: bool,

    /// Pre-block values captured by setters. Not serialized.
    delta: Option<Box<NameDelta>>,
}

impl Default for NameState {
    fn default() -> Self {
        Self {
            name: Vec::new(),
            name_hash: [0u8; 32],
            height: 0,
            renewal: 0,
            owner: Outpoint::null(),
            value: 0,
            highest: 0,
            data: Vec::new(),
            transfer: 0,
            revoked: 0,
            claimed: 0,
            renewals: 0,
            registered: false,
            expired: false,
            weak: false,
            delta: None,
        }
    }
}

impl NameState {
    /// Empty record keyed by `name_hash`, as constructed on first touch
    /// of a never-seen name.
    pub fn open(name_hash: NameHash) -> Self {
        Self {
            name_hash,
            ..Default::default()
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn name_hash(&self) -> &NameHash {
        &self.name_hash
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn renewal(&self) -> u32 {
        self.renewal
    }

    pub fn owner(&self) -> Outpoint {
        self.owner
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn highest(&self) -> u64 {
        self.highest
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn transfer(&self) -> u32 {
        self.transfer
    }

    pub fn revoked(&self) -> u32 {
        self.revoked
    }

    pub fn claimed(&self) -> u32 {
        self.claimed
    }

    pub fn renewals(&self) -> u64 {
        self.renewals
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn is_expired_flag(&self) -> bool {
        self.expired
    }

    pub fn is_weak(&self) -> bool {
        self.weak
    }

    /// True when every field sits at its zero value.
    pub fn is_null(&self) -> bool {
        self.height == 0
            && self.renewal == 0
            && self.owner.is_null()
            && self.value == 0
            && self.highest == 0
            && self.data.is_empty()
            && self.transfer == 0
            && self.revoked == 0
            && self.claimed == 0
            && self.renewals == 0
            && !self.registered
            && !self.expired
            && !self.weak
    }

    // -------------------------------------------------------------------------
    // Phase machine
    // -------------------------------------------------------------------------

    /// Phase at `height`. Pure; the first matching rule wins.
    pub fn phase(&self, height: u32, params: &NetworkParams) -> NamePhase {
        if self.revoked != 0 {
            return NamePhase::Revoked;
        }

        let h = height as u64;
        let h0 = self.height as u64;

        if self.claimed != 0 {
            if h < h0 + params.lockup_period as u64 {
                return NamePhase::Locked;
            }
            return NamePhase::Closed;
        }

        let open = params.open_period() as u64;
        if h < h0 + open {
            return NamePhase::Opening;
        }
        if h < h0 + open + params.bidding_period as u64 {
            return NamePhase::Bidding;
        }
        if h < h0 + open + params.bidding_period as u64 + params.reveal_period as u64 {
            return NamePhase::Reveal;
        }
        NamePhase::Closed
    }

    /// True while a claimed name sits inside its claim-protected window
    /// and cannot expire by renewal lapse.
    pub fn is_claim_protected(&self, height: u32, params: &NetworkParams) -> bool {
        self.claimed != 0 && (height as u64) < self.claimed as u64 + params.claim_period as u64
    }

    /// True while a weakly-claimed name refuses transfers and updates.
    pub fn is_weak_locked(&self, height: u32, params: &NetworkParams) -> bool {
        self.weak && (height as u64) < self.height as u64 + params.weak_lockup as u64
    }

    /// Whether the record counts as expired at `height`.
    pub fn is_expired(&self, height: u32, params: &NetworkParams) -> bool {
        let h = height as u64;

        if self.revoked != 0 {
            return h >= self.revoked as u64 + params.auction_maturity as u64;
        }

        if self.phase(height, params) != NamePhase::Closed {
            return false;
        }

        if self.is_claim_protected(height, params) {
            return false;
        }

        if self.owner.is_null() {
            return true;
        }

        h >= self.renewal as u64 + params.renewal_window as u64
    }

    /// Reset an expired record to a fresh OPENING at `height`.
    ///
    /// Returns true when the reset happened. Data survives a plain
    /// expiry; revocation discards it. The reset flows through setters so
    /// it is captured by the block's undo delta like any other mutation.
    pub fn maybe_expire(&mut self, height: u32, params: &NetworkParams) -> bool {
        if !self.is_expired(height, params) {
            return false;
        }

        let was_revoked = self.revoked != 0;

        self.set_height(height);
        self.set_renewal(height);
        self.set_owner(Outpoint::null());
        self.set_value(0);
        self.set_highest(0);
        self.set_transfer(0);
        self.set_revoked(0);
        self.set_claimed(0);
        self.set_renewals(0);
        self.set_registered(false);
        self.set_weak(false);
        if was_revoked {
            self.set_data(Vec::new());
        }
        self.set_expired(true);

        true
    }

    // -------------------------------------------------------------------------
    // Delta bookkeeping
    // -------------------------------------------------------------------------

    /// The captured pre-block values, if any field changed.
    pub fn delta(&self) -> Option<&NameDelta> {
        self.delta.as_deref()
    }

    /// True once any field has changed since load.
    pub fn has_delta(&self) -> bool {
        self.delta.is_some()
    }

    /// Detach the captured delta, leaving the record clean.
    pub fn take_delta(&mut self) -> Option<NameDelta> {
        self.delta.take().map(|b| *b)
    }

    fn delta_mut(&mut self) -> &mut NameDelta {
        self.delta.get_or_insert_with(Default::default)
    }

    /// On-chain snapshot for mempool tracking: any captured delta is
    /// applied back (reverting in-flight block mutations) and the
    /// resource payload is stripped, since phase prediction never needs
    /// it.
    pub fn to_stub(&self) -> NameState {
        let mut stub = self.clone();
        if let Some(delta) = stub.take_delta() {
            stub.apply_delta(&delta);
        }
        stub.data = Vec::new();
        stub
    }

    /// Overwrite fields from a stored delta. Missing fields are left
    /// untouched; present fields win unconditionally. This is the
    /// rollback path, so it bypasses delta capture.
    pub fn apply_delta(&mut self, delta: &NameDelta) {
        if let Some(v) = delta.height {
            self.height = v;
        }
        if let Some(v) = delta.renewal {
            self.renewal = v;
        }
        if let Some(v) = delta.owner {
            self.owner = v;
        }
        if let Some(v) = delta.value {
            self.value = v;
        }
        if let Some(v) = delta.highest {
            self.highest = v;
        }
        if let Some(ref v) = delta.data {
            self.data = v.clone();
        }
        if let Some(v) = delta.transfer {
            self.transfer = v;
        }
        if let Some(v) = delta.revoked {
            self.revoked = v;
        }
        if let Some(v) = delta.claimed {
            self.claimed = v;
        }
        if let Some(v) = delta.renewals {
            self.renewals = v;
        }
        if let Some(v) = delta.registered {
            self.registered = v;
        }
        if let Some(v) = delta.expired {
            self.expired = v;
        }
        if let Some(v) = delta.weak {
            self.weak = v;
        }
    }

    // -------------------------------------------------------------------------
    // Setters (delta-capturing)
    // -------------------------------------------------------------------------

    /// Fill in the name preimage. Names are immutable once known, so no
    /// delta is captured.
    pub fn set_name(&mut self, name: &[u8]) {
        if self.name.is_empty() {
            self.name = name.to_vec();
        }
    }

    pub fn set_height(&mut self, height: u32) {
        if self.height == height {
            return;
        }
        let prev = self.height;
        let d = self.delta_mut();
        d.height.get_or_insert(prev);
        self.height = height;
    }

    pub fn set_renewal(&mut self, renewal: u32) {
        if self.renewal == renewal {
            return;
        }
        let prev = self.renewal;
        let d = self.delta_mut();
        d.renewal.get_or_insert(prev);
        self.renewal = renewal;
    }

    pub fn set_owner(&mut self, owner: Outpoint) {
        if self.owner == owner {
            return;
        }
        let prev = self.owner;
        let d = self.delta_mut();
        d.owner.get_or_insert(prev);
        self.owner = owner;
    }

    pub fn set_value(&mut self, value: u64) {
        if self.value == value {
            return;
        }
        let prev = self.value;
        let d = self.delta_mut();
        d.value.get_or_insert(prev);
        self.value = value;
    }

    pub fn set_highest(&mut self, highest: u64) {
        if self.highest == highest {
            return;
        }
        let prev = self.highest;
        let d = self.delta_mut();
        d.highest.get_or_insert(prev);
        self.highest = highest;
    }

    pub fn set_data(&mut self, data: Vec<u8>) {
        if self.data == data {
            return;
        }
        let prev = std::mem::replace(&mut self.data, data);
        let d = self.delta_mut();
        d.data.get_or_insert(prev);
    }

    pub fn set_transfer(&mut self, transfer: u32) {
        if self.transfer == transfer {
            return;
        }
        let prev = self.transfer;
        let d = self.delta_mut();
        d.transfer.get_or_insert(prev);
        self.transfer = transfer;
    }

    pub fn set_revoked(&mut self, revoked: u32) {
        if self.revoked == revoked {
            return;
        }
        let prev = self.revoked;
        let d = self.delta_mut();
        d.revoked.get_or_insert(prev);
        self.revoked = revoked;
    }

    pub fn set_claimed(&mut self, claimed: u32) {
        if self.claimed == claimed {
            return;
        }
        let prev = self.claimed;
        let d = self.delta_mut();
        d.claimed.get_or_insert(prev);
        self.claimed = claimed;
    }

    pub fn set_renewals(&mut self, renewals: u64) {
        if self.renewals == renewals {
            return;
        }
        let prev = self.renewals;
        let d = self.delta_mut();
        d.renewals.get_or_insert(prev);
        self.renewals = renewals;
    }

    pub fn set_registered(&mut self, registered: bool) {
        if self.registered == registered {
            return;
        }
        let prev = self.registered;
        let d = self.delta_mut();
        d.registered.get_or_insert(prev);
        self.registered = registered;
    }

    pub fn set_expired(&mut self, expired: bool) {
        if self.expired == expired {
            return;
        }
        let prev = self.expired;
        let d = self.delta_mut();
        d.expired.get_or_insert(prev);
        self.expired = expired;
    }

    pub fn set_weak(&mut self, weak: bool) {
        if self.weak == weak {
            return;
        }
        let prev = self.weak;
        let d = self.delta_mut();
        d.weak.get_or_insert(prev);
        self.weak = weak;
    }

    // -------------------------------------------------------------------------
    // Codec
    // -------------------------------------------------------------------------

    fn field_map(&self) -> u16 {
        let mut map = 0u16;
        if !self.owner.is_null() {
            map |= FIELD_OWNER;
        }
        if self.value != 0 {
            map |= FIELD_VALUE;
        }
        if self.highest != 0 {
            map |= FIELD_HIGHEST;
        }
        if self.transfer != 0 {
            map |= FIELD_TRANSFER;
        }
        if self.revoked != 0 {
            map |= FIELD_REVOKED;
        }
        if self.claimed != 0 {
            map |= FIELD_CLAIMED;
        }
        if self.renewals != 0 {
            map |= FIELD_RENEWALS;
        }
        if self.registered {
            map |= FIELD_REGISTERED;
        }
        if self.expired {
            map |= FIELD_EXPIRED;
        }
        if self.weak {
            map |= FIELD_WEAK;
        }
        map
    }

    /// Exact encoded size.
    pub fn size(&self) -> usize {
        let mut size = 1 + self.name.len() + 2 + self.data.len() + 4 + 4 + 2;
        if !self.owner.is_null() {
            size += self.owner.size();
        }
        if self.value != 0 {
            size += varint_size(self.value);
        }
        if self.highest != 0 {
            size += varint_size(self.highest);
        }
        if self.transfer != 0 {
            size += 4;
        }
        if self.revoked != 0 {
            size += 4;
        }
        if self.claimed != 0 {
            size += 4;
        }
        if self.renewals != 0 {
            size += varint_size(self.renewals);
        }
        size
    }

    /// Serialize to the consensus layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size());

        buf.put_u8(self.name.len() as u8);
        buf.put_bytes(&self.name);
        buf.put_u16(self.data.len() as u16);
        buf.put_bytes(&self.data);
        buf.put_u32(self.height);
        buf.put_u32(self.renewal);

        let map = self.field_map();
        buf.put_u16(map);

        if map & FIELD_OWNER != 0 {
            self.owner.write(&mut buf);
        }
        if map & FIELD_VALUE != 0 {
            buf.put_varint(self.value);
        }
        if map & FIELD_HIGHEST != 0 {
            buf.put_varint(self.highest);
        }
        if map & FIELD_TRANSFER != 0 {
            buf.put_u32(self.transfer);
        }
        if map & FIELD_REVOKED != 0 {
            buf.put_u32(self.revoked);
        }
        if map & FIELD_CLAIMED != 0 {
            buf.put_u32(self.claimed);
        }
        if map & FIELD_RENEWALS != 0 {
            buf.put_varint(self.renewals);
        }

        buf
    }

    /// Decode a record, recomputing the cached name hash.
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        if bytes.len() > MAX_NAMESTATE_SIZE {
            return Err(EncodingError::Oversized {
                size: bytes.len(),
                max: MAX_NAMESTATE_SIZE,
            });
        }

        let mut r = SliceReader::new(bytes);

        let name_len = r.read_u8()? as usize;
        if name_len > MAX_NAME_SIZE {
            return Err(EncodingError::Oversized {
                size: name_len,
                max: MAX_NAME_SIZE,
            });
        }
        let name = r.read_bytes(name_len)?.to_vec();

        let data_len = r.read_u16()? as usize;
        if data_len > MAX_RECORD_DATA_SIZE {
            return Err(EncodingError::Oversized {
                size: data_len,
                max: MAX_RECORD_DATA_SIZE,
            });
        }
        let data = r.read_bytes(data_len)?.to_vec();

        let height = r.read_u32()?;
        let renewal = r.read_u32()?;

        let map = r.read_u16()?;
        if map & !FIELD_MASK != 0 {
            return Err(EncodingError::NonCanonical);
        }

        let owner = if map & FIELD_OWNER != 0 {
            Outpoint::read(&mut r)?
        } else {
            Outpoint::null()
        };
        let value = if map & FIELD_VALUE != 0 {
            r.read_varint()?
        } else {
            0
        };
        let highest = if map & FIELD_HIGHEST != 0 {
            r.read_varint()?
        } else {
            0
        };
        let transfer = if map & FIELD_TRANSFER != 0 {
            r.read_u32()?
        } else {
            0
        };
        let revoked = if map & FIELD_REVOKED != 0 {
            r.read_u32()?
        } else {
            0
        };
        let claimed = if map & FIELD_CLAIMED != 0 {
            r.read_u32()?
        } else {
            0
        };
        let renewals = if map & FIELD_RENEWALS != 0 {
            r.read_varint()?
        } else {
            0
        };

        r.expect_end()?;

        Ok(Self {
            name_hash: hash_name(&name),
            name,
            height,
            renewal,
            owner,
            value,
            highest,
            data,
            transfer,
            revoked,
            claimed,
            renewals,
            registered: map & FIELD_REGISTERED != 0,
            expired: map & FIELD_EXPIRED != 0,
            weak: map & FIELD_WEAK != 0,
            delta: None,
        })
    }
}
