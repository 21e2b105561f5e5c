//! Escher sub-trie commitments end-to-end: entering the mode through an
//! UPDATE covenant, registering compound names, and rotating keys.

use ed25519_dalek::{Signer, SigningKey};
use nm_01_name_state::{
    BlockApplier, MemoryNameStore, NameOperation, NameOutput, NameState, NameStore, NameView,
};
use nm_02_name_trie::{Batch, MemoryTrieStore, NameTrie, TrieStore, SUB_KEY_SIZE};
use nm_04_escher::{
    compound_key, EscherData, EscherError, EscherMessage, MAX_ESCHER_SIZE,
};
use shared_types::{hash_name, Hash, KeyHash, NetworkParams, Outpoint};

fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn pubkey(seed: u8) -> [u8; 32] {
    signing_key(seed).verifying_key().to_bytes()
}

fn committed_subtrie(entries: &[(KeyHash, [u8; 32])]) -> (MemoryTrieStore, Hash) {
    let store = MemoryTrieStore::new();
    let mut trie = NameTrie::new(&store, SUB_KEY_SIZE);
    for (key, value) in entries {
        trie.insert(key, value.to_vec()).unwrap();
    }
    let mut batch = Batch::new();
    let root = trie.commit(&mut batch).unwrap();
    store.batch_put(batch.into_ops()).unwrap();
    (store, root)
}

fn root_after_insert(store: &MemoryTrieStore, root: Hash, key: &KeyHash, value: &[u8; 32]) -> Hash {
    let mut trie = NameTrie::open(store, SUB_KEY_SIZE, root);
    trie.insert(key, value.to_vec()).unwrap();
    trie.root_hash()
}

/// A name record carrying escher data through the ordinary UPDATE
/// covenant path: the consensus layer sees opaque resource bytes.
#[test]
fn test_escher_data_rides_update_covenants() {
    let params = NetworkParams::simnet();
    let store = MemoryNameStore::new();
    let name_hash = hash_name(b"registry");

    let mut ns = NameState::open(name_hash);
    ns.set_name(b"registry");
    ns.set_height(10);
    ns.set_renewal(10);
    ns.set_owner(Outpoint::new([1u8; 32], 0));
    ns.set_registered(true);
    store.put_name_state(ns);

    // Enter escher mode: commit the empty sub-trie root.
    let (_subtrie, empty_root) = committed_subtrie(&[]);
    let entry_data = EscherData { root: empty_root }.encode();
    assert!(entry_data.len() <= MAX_ESCHER_SIZE);

    let update = NameOutput {
        name_hash,
        outpoint: Outpoint::new([2u8; 32], 0),
        operation: NameOperation::Update {
            data: entry_data.clone(),
        },
    };
    let mut view = NameView::new();
    BlockApplier::new(&store, params, 30)
        .connect(&mut view, &[update])
        .unwrap();
    store.commit_view(&view);

    // The committed record now exposes the sub-trie root.
    let committed = store.get_name_state(&name_hash).unwrap().unwrap();
    let parsed = EscherData::parse(committed.data()).unwrap().unwrap();
    assert_eq!(parsed.root, empty_root);
}

#[test]
fn test_register_then_update_rotation() {
    let alice = signing_key(1);
    let alice_pub = alice.verifying_key().to_bytes();
    let bob_pub = pubkey(2);
    let key = compound_key(b"wallet.registry");

    // Step 1: REGISTER into an empty sub-trie.
    let (store, root0) = committed_subtrie(&[]);
    let mut trie = NameTrie::open(&store, SUB_KEY_SIZE, root0);
    let absence = trie.prove(&key).unwrap();

    let register = EscherMessage::Register {
        current_root: root0,
        key_hash: key,
        new_key: alice_pub,
        proof: absence,
    };

    let root1 = root_after_insert(&store, root0, &key, &alice_pub);
    let data0 = Vec::new();
    let data1 = EscherData { root: root1 }.encode();
    register.verify(&data0, &data1).unwrap();

    // Step 2: the registered key signs a rotation to Bob.
    let (store, root1_committed) = committed_subtrie(&[(key, alice_pub)]);
    assert_eq!(root1, root1_committed);

    let mut trie = NameTrie::open(&store, SUB_KEY_SIZE, root1);
    let existence = trie.prove(&key).unwrap();

    let payload = EscherMessage::signing_payload(&root1, &bob_pub);
    let rotation = EscherMessage::Update {
        current_root: root1,
        key_hash: key,
        new_key: bob_pub,
        signature: alice.sign(&payload).to_bytes(),
        proof: existence,
    };

    let root2 = root_after_insert(&store, root1, &key, &bob_pub);
    let data2 = EscherData { root: root2 }.encode();
    rotation.verify(&data1, &data2).unwrap();

    // The whole exchange survives its wire form.
    let bytes = rotation.encode().unwrap();
    assert!(bytes.len() <= MAX_ESCHER_SIZE);
    assert_eq!(EscherMessage::decode(&bytes).unwrap(), rotation);
}

#[test]
fn test_register_of_existing_name_rejected() {
    // A sub-trie already binding the compound name refuses a second
    // REGISTER: the non-existence proof comes back as existence.
    let key = compound_key(b"taken.registry");
    let (store, root) = committed_subtrie(&[(key, pubkey(1))]);
    let mut trie = NameTrie::open(&store, SUB_KEY_SIZE, root);
    let proof = trie.prove(&key).unwrap();

    let message = EscherMessage::Register {
        current_root: root,
        key_hash: key,
        new_key: pubkey(2),
        proof,
    };

    let current = EscherData { root }.encode();
    let proposed = EscherData { root: [0u8; 32] }.encode();
    assert_eq!(
        message.verify(&current, &proposed),
        Err(EscherError::KeyExists)
    );
}

#[test]
fn test_proposed_root_must_match_simulation() {
    let key = compound_key(b"strict.registry");
    let (store, root) = committed_subtrie(&[]);
    let mut trie = NameTrie::open(&store, SUB_KEY_SIZE, root);
    let proof = trie.prove(&key).unwrap();

    let message = EscherMessage::Register {
        current_root: root,
        key_hash: key,
        new_key: pubkey(1),
        proof,
    };

    // Proposed data commits a root the insertion does not produce.
    let current = EscherData { root }.encode();
    let proposed = EscherData { root: [0xBB; 32] }.encode();
    assert_eq!(
        message.verify(&current, &proposed),
        Err(EscherError::NewRootMismatch)
    );
}

#[test]
fn test_mode_exit_rejected_even_with_valid_proof() {
    let key = compound_key(b"forever.registry");
    let (store, root) = committed_subtrie(&[]);
    let mut trie = NameTrie::open(&store, SUB_KEY_SIZE, root);
    let proof = trie.prove(&key).unwrap();

    let message = EscherMessage::Register {
        current_root: root,
        key_hash: key,
        new_key: pubkey(1),
        proof,
    };

    let current = EscherData { root }.encode();
    assert_eq!(
        message.verify(&current, b"plain resource record"),
        Err(EscherError::ExitMode)
    );
}
