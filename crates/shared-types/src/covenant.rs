//! Name covenant taxonomy.
//!
//! A covenant is the typed annotation on a transaction output that selects
//! a name-state transition. This crate only carries the taxonomy; the
//! transition semantics live in `nm-01-name-state`.

use crate::errors::EncodingError;

/// Covenant types recognized by the name-state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Covenant {
    /// No name effect.
    None = 0,
    /// Claim of a reserved name.
    Claim = 1,
    /// Open an auction.
    Open = 2,
    /// Sealed bid.
    Bid = 3,
    /// Bid reveal.
    Reveal = 4,
    /// First resource commitment by the auction winner.
    Register = 5,
    /// Resource replacement.
    Update = 6,
    /// Ownership renewal.
    Renew = 7,
    /// Start of an ownership transfer.
    Transfer = 8,
    /// Completion of a matured transfer.
    Finalize = 9,
    /// Irreversible revocation.
    Revoke = 10,
}

/// Mempool grouping of covenants by the phase that admits them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CovenantCategory {
    /// OPEN outputs.
    Opens,
    /// BID outputs.
    Bids,
    /// REVEAL and CLAIM outputs.
    Reveals,
    /// Everything operating on a closed name: REGISTER, UPDATE, RENEW,
    /// TRANSFER, FINALIZE, REVOKE.
    Updates,
}

impl Covenant {
    /// Decode a covenant type byte.
    pub fn from_u8(v: u8) -> Result<Self, EncodingError> {
        Ok(match v {
            0 => Covenant::None,
            1 => Covenant::Claim,
            2 => Covenant::Open,
            3 => Covenant::Bid,
            4 => Covenant::Reveal,
            5 => Covenant::Register,
            6 => Covenant::Update,
            7 => Covenant::Renew,
            8 => Covenant::Transfer,
            9 => Covenant::Finalize,
            10 => Covenant::Revoke,
            other => return Err(EncodingError::InvalidTag(other)),
        })
    }

    /// True when the covenant references a name at all.
    pub fn is_name(&self) -> bool {
        !matches!(self, Covenant::None)
    }

    /// The mempool category this covenant belongs to.
    pub fn category(&self) -> Option<CovenantCategory> {
        match self {
            Covenant::None => None,
            Covenant::Open => Some(CovenantCategory::Opens),
            Covenant::Bid => Some(CovenantCategory::Bids),
            Covenant::Reveal | Covenant::Claim => Some(CovenantCategory::Reveals),
            Covenant::Register
            | Covenant::Update
            | Covenant::Renew
            | Covenant::Transfer
            | Covenant::Finalize
            | Covenant::Revoke => Some(CovenantCategory::Updates),
        }
    }
}
