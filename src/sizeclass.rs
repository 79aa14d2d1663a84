//! Size-Class Table
//!
//! Maps record sizes to power-of-two slot sizes and bounded class indexes.
//!
//! ## Classes
//! ```text
//! class:      0     1     2    ...   19
//! slot size:  16    32    64   ...   8 MiB
//! ```
//!
//! Every allocation is sized to exactly one class's slot size, so a slot
//! freed by one record can be handed to any later record of the same class.

use crate::error::{Result, SlabError};

/// log2 of the smallest slot size
pub const FIRST_SIZECLASS: u32 = 4;

/// Number of size classes
pub const MAX_SIZES: usize = 20;

/// Largest request `round_up_size` accepts without overflowing a `u32`
const MAX_ROUNDABLE: u32 = 1 << 31;

/// Round `n` up to the next power of two.
///
/// Zero has no slot size and is rejected, as is anything above 2^31.
pub fn round_up_size(n: u32) -> Result<u32> {
    if n == 0 {
        return Err(SlabError::InvalidInput(
            "cannot size a zero-byte slot".to_string(),
        ));
    }
    if n > MAX_ROUNDABLE {
        return Err(SlabError::InvalidInput(format!(
            "size {} exceeds largest slot size {}",
            n, MAX_ROUNDABLE
        )));
    }

    let mut v = n - 1;
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    Ok(v + 1)
}

/// Class index of a slot size: `floor(log2(slot_size)) - FIRST_SIZECLASS`,
/// clamped into `[0, MAX_SIZES - 1]`.
///
/// The clamp is lossy at both ends: tiny sizes land in class 0 and huge
/// sizes land in the last class even though its slot is smaller.
pub fn slot_class(slot_size: u32) -> usize {
    let log = slot_size.checked_ilog2().unwrap_or(0);
    let index = log.saturating_sub(FIRST_SIZECLASS) as usize;
    index.min(MAX_SIZES - 1)
}

/// Slot size of a class index (`2^(index + FIRST_SIZECLASS)`)
pub fn class_slot_size(index: usize) -> u32 {
    let index = index.min(MAX_SIZES - 1) as u32;
    1u32 << (index + FIRST_SIZECLASS)
}

/// Size of the largest slot any record can occupy
pub fn max_slot_size() -> u32 {
    class_slot_size(MAX_SIZES - 1)
}

/// The class a record is allocated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeClass {
    index: usize,
}

impl SizeClass {
    /// Class for an already-known index (clamped into range)
    pub fn from_index(index: usize) -> Self {
        Self {
            index: index.min(MAX_SIZES - 1),
        }
    }

    /// Class an encoded record of `len` bytes is stored in.
    ///
    /// Small records clamp up to class 0, whose slot is larger than they
    /// need. Records larger than the biggest slot are rejected rather than
    /// clamped down into a slot that cannot hold them.
    pub fn for_record(len: usize) -> Result<Self> {
        let len = u32::try_from(len).map_err(|_| {
            SlabError::InvalidInput(format!("record of {} bytes is too large", len))
        })?;
        let slot_size = round_up_size(len)?;
        if slot_size > max_slot_size() {
            return Err(SlabError::InvalidInput(format!(
                "record of {} bytes exceeds largest slot size {}",
                len,
                max_slot_size()
            )));
        }

        Ok(Self {
            index: slot_class(slot_size),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slot_size(&self) -> u32 {
        class_slot_size(self.index)
    }
}
