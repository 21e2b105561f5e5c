//! # nm-01-name-state
//!
//! Name-state subsystem for Nomen-Chain: the per-name authoritative
//! record, its auction phase machine, and the delta/undo machinery that
//! makes every block reversible.
//!
//! ## Role in System
//!
//! - **Single Source of Truth**: the authoritative state of every name
//! - **Deterministic Transitions**: phase is a pure function of height
//!   and network parameters; it never fails
//! - **Exact Rollback**: every mutation captures its pre-block value into
//!   a sparse delta; the per-block undo bundle reverses a connect
//!   byte-for-byte
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Phase never regresses over height | `domain/namestate.rs` - `phase()` rule order |
//! | Delta captures first pre-block value only | `domain/namestate.rs` - setters |
//! | Undo restores records exactly | `domain/apply.rs` - `disconnect()` |
//! | Codec sizes are exact | `domain/namestate.rs` - `size()` = `encode().len()` |
//!
//! ## Concurrency
//!
//! The view and record types are deliberately not thread-safe; a host
//! serializes block application through its own chain lock.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::*;
pub use domain::*;
pub use ports::*;
