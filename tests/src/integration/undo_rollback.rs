//! Connect/disconnect invertibility: applying a block's undo bundle
//! must restore every touched record byte-for-byte.

use nm_01_name_state::{
    BlockApplier, MemoryNameStore, NameOperation, NameOutput, NameState, NameStore, NameUndo,
    NameView,
};
use shared_types::{hash_name, NameHash, NetworkParams, Outpoint};

fn params() -> NetworkParams {
    NetworkParams::simnet()
}

fn encode_record(store: &MemoryNameStore, hash: &NameHash) -> Vec<u8> {
    store
        .get_name_state(hash)
        .unwrap()
        .map(|ns| ns.encode())
        .unwrap_or_default()
}

#[test]
fn test_single_block_mutation_reverts_exactly() {
    let store = MemoryNameStore::new();
    let name_hash = hash_name(b"reversible");

    // Baseline: height=100, renewal=100, no owner, no value, no data.
    let mut baseline = NameState::open(name_hash);
    baseline.set_name(b"reversible");
    baseline.set_height(100);
    baseline.set_renewal(100);
    baseline.take_delta();
    store.put_name_state(baseline);
    let before = encode_record(&store, &name_hash);

    // One block mutates height, owner, value, and data.
    let mut view = NameView::new();
    {
        let ns = view.get_name_state(&store, &name_hash).unwrap();
        ns.set_height(200);
        ns.set_owner(Outpoint::new([0xAB; 32], 2));
        ns.set_value(1000);
        ns.set_data(vec![0x11; 16]);
    }
    let undo = view.to_name_undo();
    store.commit_view(&view);
    assert_ne!(encode_record(&store, &name_hash), before);

    // Round-trip the bundle through its wire form, then disconnect.
    let undo = NameUndo::decode(&undo.encode()).unwrap();
    let mut rollback = NameView::new();
    BlockApplier::new(&store, params(), 200)
        .disconnect(&mut rollback, &undo)
        .unwrap();
    for record in rollback.iter() {
        store.put_name_state(record.clone());
    }

    assert_eq!(encode_record(&store, &name_hash), before);
}

#[test]
fn test_multi_name_block_disconnect_restores_all() {
    let p = params();
    let store = MemoryNameStore::new();

    let names: [&[u8]; 3] = [b"alpha", b"beta", b"gamma"];
    let hashes: Vec<NameHash> = names.iter().map(|n| hash_name(n)).collect();

    // Block 1: open all three auctions.
    let opens: Vec<NameOutput> = names
        .iter()
        .map(|name| NameOutput {
            name_hash: hash_name(name),
            outpoint: Outpoint::null(),
            operation: NameOperation::Open {
                name: name.to_vec(),
            },
        })
        .collect();
    let mut view = NameView::new();
    BlockApplier::new(&store, p, 10)
        .connect(&mut view, &opens)
        .unwrap();
    store.commit_view(&view);

    let before: Vec<Vec<u8>> = hashes.iter().map(|h| encode_record(&store, h)).collect();

    // Block 2: reveals land on two names; the third gets nothing.
    let reveals = vec![
        NameOutput {
            name_hash: hashes[0],
            outpoint: Outpoint::new([1u8; 32], 0),
            operation: NameOperation::Reveal { value: 700 },
        },
        NameOutput {
            name_hash: hashes[1],
            outpoint: Outpoint::new([2u8; 32], 0),
            operation: NameOperation::Reveal { value: 300 },
        },
        NameOutput {
            name_hash: hashes[0],
            outpoint: Outpoint::new([3u8; 32], 0),
            operation: NameOperation::Reveal { value: 900 },
        },
    ];
    let mut view = NameView::new();
    let undo = BlockApplier::new(&store, p, 20)
        .connect(&mut view, &reveals)
        .unwrap();
    store.commit_view(&view);

    // Only the two revealed names appear, in first-touch order.
    assert_eq!(undo.len(), 2);
    assert_eq!(undo.names[0].0, hashes[0]);
    assert_eq!(undo.names[1].0, hashes[1]);

    // Disconnect block 2.
    let mut rollback = NameView::new();
    BlockApplier::new(&store, p, 20)
        .disconnect(&mut rollback, &undo)
        .unwrap();
    for record in rollback.iter() {
        store.put_name_state(record.clone());
    }

    let after: Vec<Vec<u8>> = hashes.iter().map(|h| encode_record(&store, h)).collect();
    assert_eq!(after, before);
}

#[test]
fn test_expiry_reset_is_undoable() {
    let p = params();
    let store = MemoryNameStore::new();
    let name_hash = hash_name(b"lapsing");

    // Registered name whose renewal window lapses at height 60.
    let mut ns = NameState::open(name_hash);
    ns.set_name(b"lapsing");
    ns.set_height(10);
    ns.set_renewal(10);
    ns.set_owner(Outpoint::new([7u8; 32], 0));
    ns.set_registered(true);
    ns.set_data(vec![0xEE; 24]);
    store.put_name_state(ns);
    let before = encode_record(&store, &name_hash);

    // Touching the record at 60 (a fresh OPEN) materializes the expiry
    // reset as part of the block.
    let reopen = NameOutput {
        name_hash,
        outpoint: Outpoint::null(),
        operation: NameOperation::Open {
            name: b"lapsing".to_vec(),
        },
    };
    let mut view = NameView::new();
    let undo = BlockApplier::new(&store, p, 60)
        .connect(&mut view, &[reopen])
        .unwrap();
    store.commit_view(&view);

    {
        let reset = store.get_name_state(&name_hash).unwrap().unwrap();
        assert_eq!(reset.height(), 60);
        assert!(!reset.is_registered());
        // Plain expiry keeps the committed data.
        assert_eq!(reset.data(), &[0xEE; 24]);
    }

    // Disconnecting the block resurrects the pre-expiry record.
    let mut rollback = NameView::new();
    BlockApplier::new(&store, p, 60)
        .disconnect(&mut rollback, &undo)
        .unwrap();
    for record in rollback.iter() {
        store.put_name_state(record.clone());
    }

    assert_eq!(encode_record(&store, &name_hash), before);
}
