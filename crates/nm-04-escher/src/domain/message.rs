//! Escher message codec and verification.
//!
//! Wire layout, bounded at 512 bytes:
//!
//! ```text
//! REGISTER: version(1) || currentRoot(32) || 0x00 || keyHash(20) ||
//!           newKey(32) || proof-of-nonexistence
//! UPDATE:   version(1) || currentRoot(32) || 0x01 || keyHash(20) ||
//!           newKey(32) || signature(64) || proof-of-existence
//! ```
//!
//! A name's data slot in escher mode holds `version(1) || root(32)`.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use nm_02_name_trie::{
    empty_trie_root, verify as verify_proof, MemoryTrieStore, NameTrie, Proof, SUB_KEY_SIZE,
};
use shared_types::{blake2b160, Hash, KeyHash, SliceReader, WriteExt};

use super::errors::EscherError;

/// Current escher wire version.
pub const ESCHER_VERSION: u8 = 0x01;

/// Maximum encoded message size; also bounds the data slot.
pub const MAX_ESCHER_SIZE: usize = 512;

/// Domain tag signed over by UPDATE messages.
pub const ESCHER_MAGIC: &[u8; 8] = b"ESCHERv0";

const OP_REGISTER: u8 = 0x00;
const OP_UPDATE: u8 = 0x01;

/// Derive the fixed-width sub-trie key for a compound name.
pub fn compound_key(name: &[u8]) -> KeyHash {
    blake2b160(name)
}

/// The escher-mode view of a record's data slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscherData {
    /// Committed sub-trie root.
    pub root: Hash,
}

impl EscherData {
    /// Parse a data slot; `Ok(None)` when the data is not in escher
    /// mode (does not begin with the version byte, or is empty).
    pub fn parse(data: &[u8]) -> Result<Option<Self>, EscherError> {
        if data.len() > MAX_ESCHER_SIZE {
            return Err(EscherError::Oversized(data.len()));
        }
        if data.first() != Some(&ESCHER_VERSION) {
            return Ok(None);
        }
        if data.len() != 33 {
            return Err(EscherError::Codec(shared_types::EncodingError::UnexpectedEof {
                wanted: 33,
                remaining: data.len(),
            }));
        }
        let mut root = [0u8; 32];
        root.copy_from_slice(&data[1..]);
        Ok(Some(Self { root }))
    }

    /// Serialize back into a data slot.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(33);
        buf.put_u8(ESCHER_VERSION);
        buf.put_bytes(&self.root);
        buf
    }
}

/// A sub-trie mutation message embedded in an UPDATE covenant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EscherMessage {
    /// Bind a new compound name to a public key, proving it absent.
    Register {
        current_root: Hash,
        key_hash: KeyHash,
        new_key: [u8; 32],
        proof: Proof,
    },
    /// Rebind an existing compound name, signed under the old key.
    Update {
        current_root: Hash,
        key_hash: KeyHash,
        new_key: [u8; 32],
        signature: [u8; 64],
        proof: Proof,
    },
}

impl EscherMessage {
    /// The message's claimed current sub-trie root.
    pub fn current_root(&self) -> &Hash {
        match self {
            EscherMessage::Register { current_root, .. }
            | EscherMessage::Update { current_root, .. } => current_root,
        }
    }

    /// The compound name being bound.
    pub fn key_hash(&self) -> &KeyHash {
        match self {
            EscherMessage::Register { key_hash, .. }
            | EscherMessage::Update { key_hash, .. } => key_hash,
        }
    }

    /// Serialize to the bounded wire form.
    pub fn encode(&self) -> Result<Vec<u8>, EscherError> {
        let mut buf = Vec::with_capacity(MAX_ESCHER_SIZE);
        buf.put_u8(ESCHER_VERSION);

        match self {
            EscherMessage::Register {
                current_root,
                key_hash,
                new_key,
                proof,
            } => {
                buf.put_bytes(current_root);
                buf.put_u8(OP_REGISTER);
                buf.put_bytes(key_hash);
                buf.put_bytes(new_key);
                proof.write(&mut buf);
            }
            EscherMessage::Update {
                current_root,
                key_hash,
                new_key,
                signature,
                proof,
            } => {
                buf.put_bytes(current_root);
                buf.put_u8(OP_UPDATE);
                buf.put_bytes(key_hash);
                buf.put_bytes(new_key);
                buf.put_bytes(signature);
                proof.write(&mut buf);
            }
        }

        if buf.len() > MAX_ESCHER_SIZE {
            return Err(EscherError::Oversized(buf.len()));
        }
        Ok(buf)
    }

    /// Decode a bounded wire message.
    pub fn decode(bytes: &[u8]) -> Result<Self, EscherError> {
        if bytes.len() > MAX_ESCHER_SIZE {
            return Err(EscherError::Oversized(bytes.len()));
        }

        let mut r = SliceReader::new(bytes);

        let version = r.read_u8()?;
        if version != ESCHER_VERSION {
            return Err(EscherError::InvalidVersion(version));
        }

        let current_root = r.read_hash()?;
        let opcode = r.read_u8()?;

        let mut key_hash = [0u8; 20];
        key_hash.copy_from_slice(r.read_bytes(20)?);
        let mut new_key = [0u8; 32];
        new_key.copy_from_slice(r.read_bytes(32)?);

        let message = match opcode {
            OP_REGISTER => {
                let proof = Proof::read(&mut r)?;
                EscherMessage::Register {
                    current_root,
                    key_hash,
                    new_key,
                    proof,
                }
            }
            OP_UPDATE => {
                let mut signature = [0u8; 64];
                signature.copy_from_slice(r.read_bytes(64)?);
                let proof = Proof::read(&mut r)?;
                EscherMessage::Update {
                    current_root,
                    key_hash,
                    new_key,
                    signature,
                    proof,
                }
            }
            other => return Err(EscherError::InvalidOpcode(other)),
        };

        r.expect_end().map_err(EscherError::Codec)?;
        Ok(message)
    }

    /// The preimage an UPDATE signature commits to.
    pub fn signing_payload(current_root: &Hash, new_key: &[u8; 32]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + 32 + 32);
        buf.put_bytes(ESCHER_MAGIC);
        buf.put_bytes(current_root);
        buf.put_bytes(new_key);
        buf
    }

    /// Verify this message as the transition from `current_data` to
    /// `proposed_data` on a record.
    ///
    /// Checks, in order: mode rules (no exit, empty-root entry), root
    /// consistency, the embedded (non-)existence proof, the UPDATE
    /// signature, and finally that the insertion it describes —
    /// simulated over the proof's own nodes — produces exactly the
    /// proposed root.
    pub fn verify(&self, current_data: &[u8], proposed_data: &[u8]) -> Result<(), EscherError> {
        let proposed = EscherData::parse(proposed_data)?.ok_or(EscherError::ExitMode)?;

        let current_root = match EscherData::parse(current_data)? {
            Some(current) => current.root,
            // First entry: the sub-trie starts empty.
            None => {
                if *self.current_root() != empty_trie_root() {
                    return Err(EscherError::BadEntryRoot);
                }
                empty_trie_root()
            }
        };

        if *self.current_root() != current_root {
            return Err(EscherError::RootMismatch);
        }

        let (key_hash, new_key, proof) = match self {
            EscherMessage::Register {
                key_hash,
                new_key,
                proof,
                ..
            } => {
                match verify_proof(&current_root, key_hash, proof)? {
                    None => {}
                    Some(_) => return Err(EscherError::KeyExists),
                }
                (key_hash, new_key, proof)
            }
            EscherMessage::Update {
                key_hash,
                new_key,
                signature,
                proof,
                ..
            } => {
                let bound = verify_proof(&current_root, key_hash, proof)?
                    .ok_or(EscherError::KeyMissing)?;
                let old_key: [u8; 32] =
                    bound.try_into().map_err(|_| EscherError::MalformedKey)?;

                let verifying = VerifyingKey::from_bytes(&old_key)
                    .map_err(|_| EscherError::MalformedKey)?;
                let payload = Self::signing_payload(&current_root, new_key);
                verifying
                    .verify(&payload, &Signature::from_bytes(signature))
                    .map_err(|_| EscherError::BadSignature)?;

                (key_hash, new_key, proof)
            }
        };

        // Replay the insertion over the proof's own nodes.
        let store = MemoryTrieStore::from_proof(proof);
        let mut trie = NameTrie::open(store, SUB_KEY_SIZE, current_root);
        trie.insert(key_hash, new_key.to_vec())
            .map_err(|e| EscherError::IncompleteProof(e.to_string()))?;

        if trie.root_hash() != proposed.root {
            return Err(EscherError::NewRootMismatch);
        }

        Ok(())
    }
}
