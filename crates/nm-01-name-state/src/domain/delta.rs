//! Sparse pre-mutation mirror of a name record.
//!
//! Each field is either unset (the block did not touch it) or holds the
//! value the field had before the block. The codec uses two bits per
//! field: an even "present" bit and an odd "non-zero / non-null" bit, so
//! a captured zero (or null outpoint, or empty payload) costs no payload
//! bytes while staying distinguishable from an untouched field.
//!
//! Only the wide field set is supported. The bitmap is serialized as a
//! `u32` of which the low 26 bits are meaningful; set high bits fail the
//! decode.

use shared_types::{EncodingError, Outpoint, SliceReader, WriteExt, MAX_RECORD_DATA_SIZE};

const FIELD_COUNT: u32 = 13;
const MAP_MASK: u32 = (1 << (FIELD_COUNT * 2)) - 1;

// Field indices, in codec order.
const IDX_HEIGHT: u32 = 0;
const IDX_RENEWAL: u32 = 1;
const IDX_OWNER: u32 = 2;
const IDX_VALUE: u32 = 3;
const IDX_HIGHEST: u32 = 4;
const IDX_DATA: u32 = 5;
const IDX_TRANSFER: u32 = 6;
const IDX_REVOKED: u32 = 7;
const IDX_CLAIMED: u32 = 8;
const IDX_RENEWALS: u32 = 9;
const IDX_REGISTERED: u32 = 10;
const IDX_EXPIRED: u32 = 11;
const IDX_WEAK: u32 = 12;

fn present_bit(idx: u32) -> u32 {
    1 << (idx * 2)
}

fn nonzero_bit(idx: u32) -> u32 {
    1 << (idx * 2 + 1)
}

/// Pre-block values for every touched field of one name record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameDelta {
    pub height: Option<u32>,
    pub renewal: Option<u32>,
    pub owner: Option<Outpoint>,
    pub value: Option<u64>,
    pub highest: Option<u64>,
    pub data: Option<Vec<u8>>,
    pub transfer: Option<u32>,
    pub revoked: Option<u32>,
    pub claimed: Option<u32>,
    pub renewals: Option<u64>,
    pub registered: Option<bool>,
    pub expired: Option<bool>,
    pub weak: Option<bool>,
}

impl NameDelta {
    /// True when no field was captured.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn field_map(&self) -> u32 {
        let mut map = 0u32;

        let mut mark = |idx: u32, present: bool, nonzero: bool| {
            if present {
                map |= present_bit(idx);
                if nonzero {
                    map |= nonzero_bit(idx);
                }
            }
        };

        mark(IDX_HEIGHT, self.height.is_some(), self.height.is_some_and(|v| v != 0));
        mark(IDX_RENEWAL, self.renewal.is_some(), self.renewal.is_some_and(|v| v != 0));
        mark(IDX_OWNER, self.owner.is_some(), self.owner.is_some_and(|v| !v.is_null()));
        mark(IDX_VALUE, self.value.is_some(), self.value.is_some_and(|v| v != 0));
        mark(IDX_HIGHEST, self.highest.is_some(), self.highest.is_some_and(|v| v != 0));
        mark(
            IDX_DATA,
            self.data.is_some(),
            self.data.as_ref().is_some_and(|v| !v.is_empty()),
        );
        mark(IDX_TRANSFER, self.transfer.is_some(), self.transfer.is_some_and(|v| v != 0));
        mark(IDX_REVOKED, self.revoked.is_some(), self.revoked.is_some_and(|v| v != 0));
        mark(IDX_CLAIMED, self.claimed.is_some(), self.claimed.is_some_and(|v| v != 0));
        mark(IDX_RENEWALS, self.renewals.is_some(), self.renewals.is_some_and(|v| v != 0));
        mark(IDX_REGISTERED, self.registered.is_some(), self.registered == Some(true));
        mark(IDX_EXPIRED, self.expired.is_some(), self.expired == Some(true));
        mark(IDX_WEAK, self.weak.is_some(), self.weak == Some(true));

        map
    }

    /// Serialize to the consensus layout: `u32 fieldMap` then the
    /// present, non-zero payloads in field order.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        let map = self.field_map();
        buf.put_u32(map);

        if map & nonzero_bit(IDX_HEIGHT) != 0 {
            buf.put_u32(self.height.unwrap_or(0));
        }
        if map & nonzero_bit(IDX_RENEWAL) != 0 {
            buf.put_u32(self.renewal.unwrap_or(0));
        }
        if map & nonzero_bit(IDX_OWNER) != 0 {
            if let Some(ref owner) = self.owner {
                owner.write(&mut buf);
            }
        }
        if map & nonzero_bit(IDX_VALUE) != 0 {
            buf.put_varint(self.value.unwrap_or(0));
        }
        if map & nonzero_bit(IDX_HIGHEST) != 0 {
            buf.put_varint(self.highest.unwrap_or(0));
        }
        if map & nonzero_bit(IDX_DATA) != 0 {
            if let Some(ref data) = self.data {
                buf.put_u16(data.len() as u16);
                buf.put_bytes(data);
            }
        }
        if map & nonzero_bit(IDX_TRANSFER) != 0 {
            buf.put_u32(self.transfer.unwrap_or(0));
        }
        if map & nonzero_bit(IDX_REVOKED) != 0 {
            buf.put_u32(self.revoked.unwrap_or(0));
        }
        if map & nonzero_bit(IDX_CLAIMED) != 0 {
            buf.put_u32(self.claimed.unwrap_or(0));
        }
        if map & nonzero_bit(IDX_RENEWALS) != 0 {
            buf.put_varint(self.renewals.unwrap_or(0));
        }
        // Booleans carry their value in the non-zero bit; no payload.

        buf
    }

    /// Read a delta from the cursor, leaving it positioned after the
    /// final payload.
    pub fn read(r: &mut SliceReader<'_>) -> Result<Self, EncodingError> {
        let map = r.read_u32()?;
        if map & !MAP_MASK != 0 {
            return Err(EncodingError::NonCanonical);
        }

        // A value bit without its present bit is meaningless.
        for idx in 0..FIELD_COUNT {
            if map & nonzero_bit(idx) != 0 && map & present_bit(idx) == 0 {
                return Err(EncodingError::NonCanonical);
            }
        }

        let mut delta = NameDelta::default();

        if map & present_bit(IDX_HEIGHT) != 0 {
            delta.height = Some(if map & nonzero_bit(IDX_HEIGHT) != 0 {
                r.read_u32()?
            } else {
                0
            });
        }
        if map & present_bit(IDX_RENEWAL) != 0 {
            delta.renewal = Some(if map & nonzero_bit(IDX_RENEWAL) != 0 {
                r.read_u32()?
            } else {
                0
            });
        }
        if map & present_bit(IDX_OWNER) != 0 {
            delta.owner = Some(if map & nonzero_bit(IDX_OWNER) != 0 {
                Outpoint::read(r)?
            } else {
                Outpoint::null()
            });
        }
        if map & present_bit(IDX_VALUE) != 0 {
            delta.value = Some(if map & nonzero_bit(IDX_VALUE) != 0 {
                r.read_varint()?
            } else {
                0
            });
        }
        if map & present_bit(IDX_HIGHEST) != 0 {
            delta.highest = Some(if map & nonzero_bit(IDX_HIGHEST) != 0 {
                r.read_varint()?
            } else {
                0
            });
        }
        if map & present_bit(IDX_DATA) != 0 {
            delta.data = Some(if map & nonzero_bit(IDX_DATA) != 0 {
                let len = r.read_u16()? as usize;
                if len > MAX_RECORD_DATA_SIZE {
                    return Err(EncodingError::Oversized {
                        size: len,
                        max: MAX_RECORD_DATA_SIZE,
                    });
                }
                r.read_bytes(len)?.to_vec()
            } else {
                Vec::new()
            });
        }
        if map & present_bit(IDX_TRANSFER) != 0 {
            delta.transfer = Some(if map & nonzero_bit(IDX_TRANSFER) != 0 {
                r.read_u32()?
            } else {
                0
            });
        }
        if map & present_bit(IDX_REVOKED) != 0 {
            delta.revoked = Some(if map & nonzero_bit(IDX_REVOKED) != 0 {
                r.read_u32()?
            } else {
                0
            });
        }
        if map & present_bit(IDX_CLAIMED) != 0 {
            delta.claimed = Some(if map & nonzero_bit(IDX_CLAIMED) != 0 {
                r.read_u32()?
            } else {
                0
            });
        }
        if map & present_bit(IDX_RENEWALS) != 0 {
            delta.renewals = Some(if map & nonzero_bit(IDX_RENEWALS) != 0 {
                r.read_varint()?
            } else {
                0
            });
        }
        if map & present_bit(IDX_REGISTERED) != 0 {
            delta.registered = Some(map & nonzero_bit(IDX_REGISTERED) != 0);
        }
        if map & present_bit(IDX_EXPIRED) != 0 {
            delta.expired = Some(map & nonzero_bit(IDX_EXPIRED) != 0);
        }
        if map & present_bit(IDX_WEAK) != 0 {
            delta.weak = Some(map & nonzero_bit(IDX_WEAK) != 0);
        }

        Ok(delta)
    }

    /// Decode a standalone delta, rejecting trailing bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodingError> {
        let mut r = SliceReader::new(bytes);
        let delta = Self::read(&mut r)?;
        r.expect_end()?;
        Ok(delta)
    }
}
