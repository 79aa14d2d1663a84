//! Free-List Module
//!
//! Tracks slots released by deletes so inserts can reuse them.
//!
//! ## Responsibilities
//! - One list of free locations per size class
//! - Best-fit selection on acquire
//! - Exclusive ownership of free entries (created on delete, consumed on insert)
//!
//! ## Data Structure Choice
//! Each class is a growable `Vec` whose tail is the list head:
//! - Reclaim is an O(1) push
//! - Acquire scans newest → oldest, so the most recently freed slot wins ties
//! - No linked nodes, so no dangling neighbours to patch

mod allocator;

pub use allocator::FreeListAllocator;

use crate::location::Location;

/// A reclaimed slot waiting to be reused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeEntry {
    /// Where the freed slot lives
    pub location: Location,

    /// Size class the slot belongs to
    pub size_class: usize,
}
