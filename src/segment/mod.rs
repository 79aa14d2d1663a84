//! Segment Module
//!
//! Fixed-capacity, memory-mapped backing files.
//!
//! ## Responsibilities
//! - Create zero-filled segment files of exactly `segment_size` bytes
//! - Map each segment once, read/write and shared with its file
//! - Roll over to a new segment when the append cursor would overflow
//! - Resolve a location to a bounds-checked byte span
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │ Header (16 bytes)                                      │
//! │   Magic: "SLKV" (4) | Version: u16 (2) | Reserved (2)  │
//! │   Segment ID: u32 (4) | Reserved (4)                   │
//! ├────────────────────────────────────────────────────────┤
//! │ Slots (power-of-two sized, appended back to back)      │
//! │   [record][slack] [record][slack] ...                  │
//! ├────────────────────────────────────────────────────────┤
//! │ Zeroes up to segment_size                              │
//! └────────────────────────────────────────────────────────┘
//! ```

mod file;
mod manager;

pub use file::Segment;
pub use manager::SegmentManager;

/// Magic bytes identifying a SlabKV segment file
pub(crate) const MAGIC: &[u8; 4] = b"SLKV";

/// Current segment format version
pub(crate) const VERSION: u16 = 1;

/// Bytes reserved at the start of every segment; also the first usable
/// slot position
pub const SEGMENT_HEADER_SIZE: u64 = 16;

/// Default segment capacity (64 MB)
pub const MAX_FILESIZE: u64 = 64 * 1024 * 1024;
