//! Free-list allocator
//!
//! Per size-class lists of reclaimed locations.

use crate::location::Location;
use crate::sizeclass::{class_slot_size, MAX_SIZES};

use super::FreeEntry;

/// Free locations grouped by size class
#[derive(Debug)]
pub struct FreeListAllocator {
    /// One list per class; the last element is the list head
    lists: Vec<Vec<FreeEntry>>,
}

impl FreeListAllocator {
    /// Create an allocator with an empty list for every class
    pub fn new() -> Self {
        Self {
            lists: (0..MAX_SIZES).map(|_| Vec::new()).collect(),
        }
    }

    /// Return a location to the list for `class` (O(1) insert at head)
    pub fn reclaim(&mut self, class: usize, location: Location) {
        let class = class.min(MAX_SIZES - 1);
        self.lists[class].push(FreeEntry {
            location,
            size_class: class,
        });
    }

    /// Take the best-fitting free location for a record of `requested_size`
    /// bytes out of the list for `class`.
    ///
    /// Walks the whole list newest → oldest and keeps the candidate with the
    /// smallest non-negative slack; on a tie the first one visited wins.
    /// Returns `None` when nothing in the list is large enough.
    pub fn acquire(&mut self, class: usize, requested_size: u32) -> Option<Location> {
        let list = self.lists.get_mut(class)?;

        let mut best: Option<(usize, u32)> = None;
        for (idx, entry) in list.iter().enumerate().rev() {
            let slot_size = class_slot_size(entry.size_class);
            let Some(slack) = slot_size.checked_sub(requested_size) else {
                continue;
            };
            match best {
                Some((_, best_slack)) if best_slack <= slack => {}
                _ => best = Some((idx, slack)),
            }
        }

        let (idx, _) = best?;
        Some(list.remove(idx).location)
    }

    /// Unlink `location` from the list for `class` (O(n) search).
    ///
    /// Returns `false` if the location was not in the list.
    pub fn remove(&mut self, class: usize, location: Location) -> bool {
        let Some(list) = self.lists.get_mut(class) else {
            return false;
        };

        match list.iter().rposition(|entry| entry.location == location) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Whether `location` is currently free in `class`
    pub fn contains(&self, class: usize, location: Location) -> bool {
        self.lists
            .get(class)
            .is_some_and(|list| list.iter().any(|entry| entry.location == location))
    }

    /// Number of free entries in `class`
    pub fn len(&self, class: usize) -> usize {
        self.lists.get(class).map_or(0, Vec::len)
    }

    /// Number of free entries across all classes
    pub fn total_free(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    /// Check if every list is empty
    pub fn is_empty(&self) -> bool {
        self.total_free() == 0
    }
}

impl Default for FreeListAllocator {
    fn default() -> Self {
        Self::new()
    }
}
