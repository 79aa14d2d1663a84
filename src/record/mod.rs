//! Record Module
//!
//! The on-disk unit stored in a slot.
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬──────────────────┬────────────────┬───────┬─────────┐
//! │ Kind (1) │ TotalLen u32 (4) │ KeyLen u16 (2) │  Key  │  Value  │
//! └──────────┴──────────────────┴────────────────┴───────┴─────────┘
//! ```
//!
//! - All integers are little-endian
//! - `TotalLen = 7 + KeyLen + ValueLen`
//! - A tombstone is `[2][7][0]` with no key or value bytes; whatever the
//!   slot held before stays behind it unless the store scrubs it

mod codec;

pub use codec::{decode, encode, encode_tombstone, read_header};

use bytes::Bytes;

/// Header size: Kind (1) + TotalLen (4) + KeyLen (2) = 7 bytes
pub const RECORD_HEADER_SIZE: usize = 7;

/// Record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordKind {
    Live = 0x01,
    Tombstone = 0x02,
}

impl TryFrom<u8> for RecordKind {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0x01 => Ok(RecordKind::Live),
            0x02 => Ok(RecordKind::Tombstone),
            other => Err(other),
        }
    }
}

/// Parsed fixed-size record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub kind: RecordKind,
    pub total_len: u32,
    pub key_len: u16,
}

impl RecordHeader {
    /// Length of the value implied by the header
    pub fn value_len(&self) -> usize {
        (self.total_len as usize).saturating_sub(RECORD_HEADER_SIZE + self.key_len as usize)
    }
}

/// A decoded record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: RecordKind,
    pub key: Bytes,
    pub value: Bytes,
}

impl Record {
    /// Check if the record is a tombstone
    pub fn is_tombstone(&self) -> bool {
        self.kind == RecordKind::Tombstone
    }

    /// Encoded length (header + key + value)
    pub fn encoded_len(&self) -> usize {
        RECORD_HEADER_SIZE + self.key.len() + self.value.len()
    }
}
