//! Full auction lifecycle: phase schedule, expiry, and reopening.

use nm_01_name_state::{
    BlockApplier, MemoryNameStore, NameOperation, NameOutput, NamePhase, NameState, NameStore,
    NameView,
};
use shared_types::{hash_name, NetworkParams, Outpoint};

fn params() -> NetworkParams {
    NetworkParams::simnet()
}

fn opened(height: u32) -> NameState {
    let mut ns = NameState::open(hash_name(b"lifecycle"));
    ns.set_name(b"lifecycle");
    ns.set_height(height);
    ns.set_renewal(height);
    ns.take_delta();
    ns
}

#[test]
fn test_open_to_close_schedule() {
    // tree_interval=4 (open period 5), bidding 5, reveal 3; opened at 10.
    let p = params();
    let ns = opened(10);

    let expected = [
        (10..15, NamePhase::Opening),
        (15..20, NamePhase::Bidding),
        (20..23, NamePhase::Reveal),
        (23..30, NamePhase::Closed),
    ];

    for (range, phase) in expected {
        for h in range {
            assert_eq!(ns.phase(h, &p), phase, "height {h}");
        }
    }
}

#[test]
fn test_ownerless_close_expires_and_reopens() {
    let p = params();
    let mut ns = opened(10);

    // No reveal ever confirmed an owner: the moment the auction closes,
    // the record is expired and resets to a fresh OPENING.
    assert!(ns.is_expired(23, &p));
    assert!(ns.maybe_expire(23, &p));
    assert!(ns.is_expired_flag());
    assert_eq!(ns.height(), 23);
    assert_eq!(ns.phase(23, &p), NamePhase::Opening);
}

#[test]
fn test_phase_never_regresses() {
    let p = params();

    let rank = |phase: NamePhase| -> u8 {
        match phase {
            NamePhase::Opening => 0,
            NamePhase::Bidding => 1,
            NamePhase::Reveal => 2,
            NamePhase::Locked => 3,
            NamePhase::Closed => 4,
            NamePhase::Revoked => 5,
        }
    };

    // Plain auction, claimed name, revoked name.
    let mut claimed = opened(10);
    claimed.set_claimed(10);
    let mut revoked = opened(10);
    revoked.set_revoked(15);

    for ns in [opened(10), claimed, revoked] {
        let mut last = rank(ns.phase(ns.height(), &p));
        for h in ns.height()..ns.height() + 200 {
            let now = rank(ns.phase(h, &p));
            assert!(
                now >= last,
                "phase regressed at height {h}: {now} < {last}"
            );
            last = now;
        }
    }
}

#[test]
fn test_renewal_extends_ownership() {
    let p = params();
    let store = MemoryNameStore::new();
    let name_hash = hash_name(b"renewed");

    let mut ns = NameState::open(name_hash);
    ns.set_name(b"renewed");
    ns.set_height(10);
    ns.set_renewal(10);
    ns.set_owner(Outpoint::new([1u8; 32], 0));
    ns.set_registered(true);
    ns.set_data(vec![1]);
    store.put_name_state(ns);

    // renewal_window=50: would expire at 60 without the renewal at 40.
    let renew = NameOutput {
        name_hash,
        outpoint: Outpoint::new([2u8; 32], 0),
        operation: NameOperation::Renew,
    };
    let mut view = NameView::new();
    BlockApplier::new(&store, p, 40)
        .connect(&mut view, &[renew])
        .unwrap();
    store.commit_view(&view);

    let ns = store.get_name_state(&name_hash).unwrap().unwrap();
    assert_eq!(ns.renewal(), 40);
    assert_eq!(ns.renewals(), 1);
    assert!(!ns.is_expired(60, &p));
    assert!(ns.is_expired(90, &p));
}

#[test]
fn test_expired_name_can_be_reopened_by_open() {
    let p = params();
    let store = MemoryNameStore::new();
    let name_hash = hash_name(b"secondlife");

    // Ownerless auction opened at 10 lapses at 23.
    let mut ns = NameState::open(name_hash);
    ns.set_name(b"secondlife");
    ns.set_height(10);
    ns.set_renewal(10);
    store.put_name_state(ns);

    let reopen = NameOutput {
        name_hash,
        outpoint: Outpoint::null(),
        operation: NameOperation::Open {
            name: b"secondlife".to_vec(),
        },
    };

    let mut view = NameView::new();
    BlockApplier::new(&store, p, 30)
        .connect(&mut view, &[reopen])
        .unwrap();

    let ns = view.get(&name_hash).unwrap();
    assert_eq!(ns.height(), 30);
    assert!(!ns.is_expired_flag(), "a fresh OPEN clears the expiry mark");
    assert_eq!(ns.phase(30, &p), NamePhase::Opening);
}

#[test]
fn test_claimed_name_lockup_then_expiry_protection() {
    let p = params();
    let mut ns = opened(10);
    ns.set_claimed(10);
    ns.set_owner(Outpoint::new([3u8; 32], 0));
    ns.take_delta();

    // Locked through the lockup period (6 blocks), closed after.
    assert_eq!(ns.phase(15, &p), NamePhase::Locked);
    assert_eq!(ns.phase(16, &p), NamePhase::Closed);

    // Claim protection outlasts the renewal window (claim_period=60).
    assert!(!ns.is_expired(65, &p));
    assert!(ns.is_expired(70, &p));
}
