//! Randomized codec round-trips for records, deltas, and undo bundles.

use nm_01_name_state::{NameDelta, NameState, NameUndo};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{hash_name, Outpoint, MAX_NAMESTATE_SIZE};

fn random_name(rng: &mut StdRng) -> Vec<u8> {
    let len = rng.gen_range(1..=63);
    (0..len).map(|_| rng.gen_range(b'a'..=b'z')).collect()
}

fn random_outpoint(rng: &mut StdRng) -> Outpoint {
    if rng.gen_bool(0.2) {
        Outpoint::null()
    } else {
        Outpoint::new(rng.gen(), rng.gen_range(0..1000))
    }
}

fn random_record(rng: &mut StdRng) -> NameState {
    let name = random_name(rng);
    let mut ns = NameState::open(hash_name(&name));
    ns.set_name(&name);
    ns.set_height(rng.gen());
    ns.set_renewal(rng.gen());
    ns.set_owner(random_outpoint(rng));
    ns.set_value(rng.gen_range(0..u64::MAX >> 8));
    ns.set_highest(rng.gen_range(0..u64::MAX >> 8));
    if rng.gen_bool(0.7) {
        let len = rng.gen_range(0..=512);
        ns.set_data((0..len).map(|_| rng.gen()).collect());
    }
    if rng.gen_bool(0.3) {
        ns.set_transfer(rng.gen());
    }
    if rng.gen_bool(0.2) {
        ns.set_revoked(rng.gen());
    }
    if rng.gen_bool(0.2) {
        ns.set_claimed(rng.gen());
    }
    ns.set_renewals(rng.gen_range(0..10_000));
    ns.set_registered(rng.gen_bool(0.5));
    ns.set_expired(rng.gen_bool(0.2));
    ns.set_weak(rng.gen_bool(0.2));
    ns.take_delta();
    ns
}

fn random_delta(rng: &mut StdRng) -> NameDelta {
    NameDelta {
        height: rng.gen_bool(0.5).then(|| rng.gen()),
        renewal: rng.gen_bool(0.5).then(|| rng.gen()),
        owner: rng.gen_bool(0.5).then(|| random_outpoint(rng)),
        value: rng.gen_bool(0.5).then(|| rng.gen_range(0..u64::MAX >> 8)),
        highest: rng.gen_bool(0.5).then(|| rng.gen_range(0..u64::MAX >> 8)),
        data: rng.gen_bool(0.5).then(|| {
            let len = rng.gen_range(0..=512);
            (0..len).map(|_| rng.gen()).collect()
        }),
        transfer: rng.gen_bool(0.5).then(|| rng.gen()),
        revoked: rng.gen_bool(0.5).then(|| rng.gen()),
        claimed: rng.gen_bool(0.5).then(|| rng.gen()),
        renewals: rng.gen_bool(0.5).then(|| rng.gen_range(0..10_000)),
        registered: rng.gen_bool(0.5).then(|| rng.gen_bool(0.5)),
        expired: rng.gen_bool(0.5).then(|| rng.gen_bool(0.5)),
        weak: rng.gen_bool(0.5).then(|| rng.gen_bool(0.5)),
    }
}

#[test]
fn test_record_codec_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0xC0DEC);

    for _ in 0..500 {
        let record = random_record(&mut rng);
        let bytes = record.encode();

        assert_eq!(bytes.len(), record.size(), "size() must be exact");
        assert!(bytes.len() <= MAX_NAMESTATE_SIZE);

        let decoded = NameState::decode(&bytes).unwrap();
        assert_eq!(decoded, record);
        // Re-encoding committed bytes is the identity.
        assert_eq!(decoded.encode(), bytes);
    }
}

#[test]
fn test_delta_codec_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0xDE17A);

    for _ in 0..500 {
        let delta = random_delta(&mut rng);
        let bytes = delta.encode();
        let decoded = NameDelta::decode(&bytes).unwrap();
        assert_eq!(decoded, delta);
        assert_eq!(decoded.encode(), bytes);
    }
}

#[test]
fn test_undo_codec_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0x0D0);

    for _ in 0..100 {
        let count = rng.gen_range(0..20);
        let undo = NameUndo {
            names: (0..count)
                .map(|_| (rng.gen::<[u8; 32]>(), random_delta(&mut rng)))
                .collect(),
        };

        let bytes = undo.encode();
        let decoded = NameUndo::decode(&bytes).unwrap();
        assert_eq!(decoded, undo);
        assert_eq!(decoded.encode(), bytes);
    }
}

#[test]
fn test_null_vs_zero_distinction_survives() {
    // A delta that captured zero values must stay distinguishable from
    // one that captured nothing.
    let captured_zero = NameDelta {
        value: Some(0),
        owner: Some(Outpoint::null()),
        registered: Some(false),
        ..Default::default()
    };
    let untouched = NameDelta::default();

    let a = NameDelta::decode(&captured_zero.encode()).unwrap();
    let b = NameDelta::decode(&untouched.encode()).unwrap();

    assert_ne!(a, b);
    assert_eq!(a.value, Some(0));
    assert_eq!(a.owner, Some(Outpoint::null()));
    assert_eq!(a.registered, Some(false));
    assert_eq!(b.value, None);
}
