//! Location Codec
//!
//! Packs and unpacks the 64-bit handle returned by `Store::insert`.
//!
//! ## Bit Layout
//! ```text
//! ┌──────────────────┬──────────────────────────────┬──────────────┐
//! │ Segment ID (16)  │    Slot Position (40)        │ Size Class(8)│
//! └──────────────────┴──────────────────────────────┴──────────────┘
//!  63            48   47                          8   7          0
//! ```
//!
//! The layout is private to the engine. Callers only ever hold a [`Handle`]
//! and must never build one by hand.

use std::fmt;

/// Bits used by the size class index
const SIZE_CLASS_BITS: u32 = 8;

/// Bits used by the in-segment byte offset
const SLOT_POSITION_BITS: u32 = 40;

/// Bits used by the segment number
const SEGMENT_ID_BITS: u32 = 16;

const SIZE_CLASS_MASK: u64 = (1 << SIZE_CLASS_BITS) - 1;
const SLOT_POSITION_MASK: u64 = (1 << SLOT_POSITION_BITS) - 1;

/// Largest byte offset a location can address
pub const MAX_SLOT_POSITION: u64 = SLOT_POSITION_MASK;

/// Number of distinct segment numbers a location can address
pub const MAX_SEGMENTS: u32 = 1 << SEGMENT_ID_BITS;

/// Opaque record handle
///
/// Returned by insert and accepted by get/delete/update. The only supported
/// operations are comparison and conversion to/from the raw `u64` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Wrap a raw token previously obtained from [`Handle::as_u64`]
    pub fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw token, for callers that store handles externally
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Decoded form of a handle: where a record lives and how big its slot is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    segment_id: u16,
    slot_position: u64,
    size_class: u8,
}

impl Location {
    /// Build a location.
    ///
    /// `slot_position` must not exceed [`MAX_SLOT_POSITION`]; the segment
    /// manager never hands out larger offsets because segment sizes are
    /// validated against it.
    pub fn new(segment_id: u16, slot_position: u64, size_class: u8) -> Self {
        debug_assert!(slot_position <= MAX_SLOT_POSITION);
        Self {
            segment_id,
            slot_position: slot_position & SLOT_POSITION_MASK,
            size_class,
        }
    }

    pub fn segment_id(&self) -> u16 {
        self.segment_id
    }

    pub fn slot_position(&self) -> u64 {
        self.slot_position
    }

    pub fn size_class(&self) -> u8 {
        self.size_class
    }

    /// Same place, different size class
    pub fn with_size_class(self, size_class: u8) -> Self {
        Self { size_class, ..self }
    }

    /// Same segment, different byte offset
    pub fn with_slot_position(self, slot_position: u64) -> Self {
        Self::new(self.segment_id, slot_position, self.size_class)
    }

    /// Pack into the opaque 64-bit handle
    pub fn pack(&self) -> Handle {
        let raw = (u64::from(self.segment_id) << (SLOT_POSITION_BITS + SIZE_CLASS_BITS))
            | (self.slot_position << SIZE_CLASS_BITS)
            | u64::from(self.size_class);
        Handle(raw)
    }

    /// Unpack an opaque handle
    pub fn unpack(handle: Handle) -> Self {
        let raw = handle.0;
        Self {
            segment_id: (raw >> (SLOT_POSITION_BITS + SIZE_CLASS_BITS)) as u16,
            slot_position: (raw >> SIZE_CLASS_BITS) & SLOT_POSITION_MASK,
            size_class: (raw & SIZE_CLASS_MASK) as u8,
        }
    }
}

impl From<Location> for Handle {
    fn from(location: Location) -> Self {
        location.pack()
    }
}

impl From<Handle> for Location {
    fn from(handle: Handle) -> Self {
        Location::unpack(handle)
    }
}
