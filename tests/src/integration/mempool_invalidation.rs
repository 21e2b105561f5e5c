//! Phase-boundary eviction coverage across a full auction.

use nm_01_name_state::{MemoryNameStore, NameState};
use nm_03_mempool_names::{ContractConfig, ContractState, NameRef};
use shared_types::{hash_name, Covenant, Hash, NetworkParams, Outpoint};

fn params() -> NetworkParams {
    NetworkParams::simnet()
}

const OPEN_TX: Hash = [0x10; 32];
const BID_TX: Hash = [0x20; 32];
const REVEAL_TX: Hash = [0x30; 32];
const UPDATE_TX: Hash = [0x40; 32];

/// Auction opened at 10 with an owner already revealed, so update-class
/// transactions stay plausible after close.
fn seeded_store(name: &[u8]) -> MemoryNameStore {
    let store = MemoryNameStore::new();
    let mut ns = NameState::open(hash_name(name));
    ns.set_name(name);
    ns.set_height(10);
    ns.set_renewal(10);
    ns.set_owner(Outpoint::new([9u8; 32], 0));
    ns.set_registered(true);
    store.put_name_state(ns);
    store
}

fn tracked_state(store: &MemoryNameStore, name: &[u8]) -> ContractState {
    let hash = hash_name(name);
    let mut state = ContractState::new(params());
    state
        .track(OPEN_TX, &[NameRef::new(Covenant::Open, hash)], store)
        .unwrap();
    state
        .track(BID_TX, &[NameRef::new(Covenant::Bid, hash)], store)
        .unwrap();
    state
        .track(REVEAL_TX, &[NameRef::new(Covenant::Reveal, hash)], store)
        .unwrap();
    state
        .track(UPDATE_TX, &[NameRef::new(Covenant::Update, hash)], store)
        .unwrap();
    state
}

#[test]
fn test_eviction_tracks_every_phase_boundary() {
    let store = seeded_store(b"sweep");
    let state = tracked_state(&store, b"sweep");

    // OPENING (10..14): in-flight updates reference a record that is
    // still mid-auction.
    let evicted = state.invalidate(12);
    assert!(evicted.contains(&UPDATE_TX));
    assert!(!evicted.contains(&OPEN_TX));

    // BIDDING at 15: opens become inadmissible.
    let evicted = state.invalidate(15);
    assert!(evicted.contains(&OPEN_TX));
    assert!(!evicted.contains(&BID_TX));

    // REVEAL at 20: bids die.
    let evicted = state.invalidate(20);
    assert!(evicted.contains(&BID_TX));
    assert!(!evicted.contains(&REVEAL_TX));

    // CLOSED at 23: reveals die; updates survive until expiration.
    let evicted = state.invalidate(23);
    assert!(evicted.contains(&REVEAL_TX));
    assert!(!evicted.contains(&UPDATE_TX));
}

#[test]
fn test_reveal_to_closed_keeps_updates() {
    // The documented boundary case: BID + REVEAL + UPDATE in flight
    // while the name closes at h+1.
    let store = seeded_store(b"closing");
    let state = tracked_state(&store, b"closing");

    let evicted = state.invalidate(23);
    assert!(evicted.contains(&REVEAL_TX));
    assert!(!evicted.contains(&UPDATE_TX));
}

#[test]
fn test_expiration_finally_evicts_updates() {
    let store = seeded_store(b"fading");
    let state = tracked_state(&store, b"fading");

    // renewal 10 + window 50: expired at 60.
    let evicted = state.invalidate(60);
    assert!(evicted.contains(&UPDATE_TX));
}

#[test]
fn test_untracked_names_produce_no_evictions() {
    let store = seeded_store(b"quiet");
    let mut state = tracked_state(&store, b"quiet");
    let hash = hash_name(b"quiet");

    state.untrack(&OPEN_TX, &[NameRef::new(Covenant::Open, hash)]);
    state.untrack(&BID_TX, &[NameRef::new(Covenant::Bid, hash)]);
    state.untrack(&REVEAL_TX, &[NameRef::new(Covenant::Reveal, hash)]);
    state.untrack(&UPDATE_TX, &[NameRef::new(Covenant::Update, hash)]);

    assert!(state.is_empty());
    assert!(state.invalidate(23).is_empty());
}

#[test]
fn test_hardened_mode_sweeps_weak_names_only() {
    let store = MemoryNameStore::new();

    let mut weak = NameState::open(hash_name(b"weakling"));
    weak.set_name(b"weakling");
    weak.set_height(10);
    weak.set_renewal(10);
    weak.set_claimed(10);
    weak.set_weak(true);
    weak.set_owner(Outpoint::new([1u8; 32], 0));
    store.put_name_state(weak);

    let mut strong = NameState::open(hash_name(b"stalwart"));
    strong.set_name(b"stalwart");
    strong.set_height(10);
    strong.set_renewal(10);
    strong.set_claimed(10);
    strong.set_owner(Outpoint::new([2u8; 32], 0));
    store.put_name_state(strong);

    let mut state =
        ContractState::with_config(params(), ContractConfig { hardened: true });
    state
        .track(
            [0x01; 32],
            &[NameRef::new(Covenant::Update, hash_name(b"weakling"))],
            &store,
        )
        .unwrap();
    state
        .track(
            [0x02; 32],
            &[NameRef::new(Covenant::Update, hash_name(b"stalwart"))],
            &store,
        )
        .unwrap();

    // Locked phase at 12: only the weak name's tx is swept.
    let evicted = state.invalidate(12);
    assert!(evicted.contains(&[0x01; 32]));
    assert!(!evicted.contains(&[0x02; 32]));
}

#[test]
fn test_one_tx_watching_many_names() {
    let store_a = seeded_store(b"first");
    let mut ns = NameState::open(hash_name(b"second"));
    ns.set_name(b"second");
    ns.set_height(10);
    ns.set_renewal(10);
    store_a.put_name_state(ns);

    let tx = [0x77; 32];
    let refs = [
        NameRef::new(Covenant::Update, hash_name(b"first")),
        NameRef::new(Covenant::Open, hash_name(b"second")),
    ];

    let mut state = ContractState::new(params());
    state.track(tx, &refs, &store_a).unwrap();
    assert_eq!(state.len(), 2);

    // Either watched name can kill the transaction: "second" enters
    // BIDDING at 15.
    assert!(state.invalidate(15).contains(&tx));

    state.untrack(&tx, &refs);
    assert!(state.is_empty());
}
