//! Store Module
//!
//! The storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Size and encode records, then place them in a reused or fresh slot
//! - Resolve handles back to records
//! - Tombstone deleted records and recycle their slots
//! - Serialize mutations against concurrent readers

use std::path::Path;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, SlabError};
use crate::freelist::FreeListAllocator;
use crate::location::{Handle, Location};
use crate::record::{self, RecordHeader, RecordKind, RECORD_HEADER_SIZE};
use crate::segment::SegmentManager;
use crate::sizeclass::SizeClass;

/// Snapshot of store bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of mapped segments
    pub segment_count: usize,

    /// Reclaimed slots waiting to be reused, across all classes
    pub free_slots: usize,

    /// Segment holding the append cursor
    pub end_segment: u16,

    /// Byte offset of the append cursor inside `end_segment`
    pub end_position: u64,
}

/// The storage engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (insert/delete/update): take the write half of `inner`
///   - Cursor, free lists and segment creation change under one lock
///
/// - **Reads** (get/stats): take the read half of `inner`
///   - Many concurrent readers, never overlapping a write
///
/// Dropping the store unmaps every segment and closes its file once.
pub struct Store {
    /// Store configuration
    config: Config,

    /// Segments, cursor and free lists
    inner: RwLock<StoreInner>,
}

/// Mutable state guarded by the store lock
struct StoreInner {
    /// Mapped segment files
    segments: SegmentManager,

    /// Where the next fresh slot is carved from
    end_loc: Location,

    /// Reclaimed slots per size class
    freelist: FreeListAllocator,
}

impl Store {
    /// Open a fresh store with the given config
    ///
    /// On startup:
    /// 1. Validate the config
    /// 2. Create the data directory and segment 0
    /// 3. Place the append cursor at the first usable slot
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        let segments =
            SegmentManager::open(&config.data_dir, config.segment_size, config.preallocate)?;
        let end_loc = segments.first_location();

        info!(
            data_dir = %config.data_dir.display(),
            segment_size = config.segment_size,
            preallocate = config.preallocate,
            "store opened"
        );

        Ok(Self {
            config,
            inner: RwLock::new(StoreInner {
                segments,
                end_loc,
                freelist: FreeListAllocator::new(),
            }),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory and
    /// preallocation flag
    pub fn init(base_path: &Path, preallocate: bool) -> Result<Self> {
        let config = Config::builder()
            .data_dir(base_path)
            .preallocate(preallocate)
            .build();
        Self::open(config)
    }

    /// Insert a key-value pair, returning the handle that addresses it
    ///
    /// Steps:
    /// 1. Encode the record and pick its size class
    /// 2. Acquire write lock
    /// 3. Reuse a free slot of that class, or carve a fresh one
    /// 4. Copy the record into the slot
    pub fn insert(&self, key: &[u8], value: &[u8]) -> Result<Handle> {
        let encoded = record::encode(RecordKind::Live, key, value)?;
        let class = self.classify(encoded.len())?;

        let mut inner = self.inner.write();
        let handle = inner.place(&encoded, class)?;

        debug!(
            %handle,
            key_len = key.len(),
            value_len = value.len(),
            class = class.index(),
            "inserted record"
        );
        Ok(handle)
    }

    /// Get the key and value a handle addresses
    ///
    /// Returns:
    /// - `Ok((key, value))`: live record
    /// - `Err(NotFound)`: the record was deleted
    /// - `Err(CorruptRecord)`: the slot does not hold a valid record
    pub fn get(&self, handle: Handle) -> Result<(Vec<u8>, Vec<u8>)> {
        let location = Location::unpack(handle);

        let inner = self.inner.read();
        let slot = inner.segments.slot(location)?;
        let record = record::decode(slot, usize::from(location.size_class()))?;

        if record.is_tombstone() {
            return Err(SlabError::NotFound(handle));
        }

        Ok((record.key.to_vec(), record.value.to_vec()))
    }

    /// Delete the record a handle addresses
    ///
    /// Writes a tombstone header over the record and returns its slot to the
    /// free list. Deleting an already deleted record fails with
    /// `AlreadyDeleted` and leaves the free list untouched.
    pub fn delete(&self, handle: Handle) -> Result<()> {
        let location = Location::unpack(handle);

        let mut inner = self.inner.write();
        match inner.remove(location, self.config.scrub_on_delete) {
            Ok(()) => {
                debug!(%handle, "deleted record");
                Ok(())
            }
            Err(SlabError::AlreadyDeleted(h)) => {
                warn!(handle = %h, "rejected double delete");
                Err(SlabError::AlreadyDeleted(h))
            }
            Err(e) => Err(e),
        }
    }

    /// Replace the record a handle addresses
    ///
    /// Steps (under a single write lock):
    /// 1. Check the old record is live
    /// 2. Same size class: overwrite the old slot in place
    /// 3. Otherwise reserve and fill the new slot, then tombstone the old one
    ///
    /// The old record stays readable if any step fails. The returned handle
    /// replaces the old one, which must not be used again even when both are
    /// equal.
    pub fn update(&self, handle: Handle, key: &[u8], value: &[u8]) -> Result<Handle> {
        let encoded = record::encode(RecordKind::Live, key, value)?;
        let class = self.classify(encoded.len())?;
        let location = Location::unpack(handle);
        let scrub = self.config.scrub_on_delete;

        let mut inner = self.inner.write();
        let old = inner.live_header(location)?;

        let new_handle = if usize::from(location.size_class()) == class.index() {
            if scrub {
                inner.erase_payload(location, &old)?;
            }
            inner.fill(location, &encoded)?
        } else {
            let target = inner.reserve(encoded.len(), class)?;
            let new_handle = inner.fill(target, &encoded)?;
            inner.tombstone(location, &old, scrub)?;
            new_handle
        };

        debug!(old = %handle, new = %new_handle, "updated record");
        Ok(new_handle)
    }

    /// Write dirty pages of every segment back to disk
    pub fn flush(&self) -> Result<()> {
        self.inner.read().segments.flush()
    }

    /// Close the store gracefully
    ///
    /// Flushes every mapping, then unmaps and closes all segments
    pub fn close(self) -> Result<()> {
        self.flush()?;
        info!(
            data_dir = %self.config.data_dir.display(),
            segments = self.segment_count(),
            "store closed"
        );
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get a snapshot of store bookkeeping
    pub fn stats(&self) -> StoreStats {
        let inner = self.inner.read();
        StoreStats {
            segment_count: inner.segments.segment_count(),
            free_slots: inner.freelist.total_free(),
            end_segment: inner.end_loc.segment_id(),
            end_position: inner.end_loc.slot_position(),
        }
    }

    /// Get the number of mapped segments
    pub fn segment_count(&self) -> usize {
        self.inner.read().segments.segment_count()
    }

    /// Get the number of free slots in a size class
    pub fn free_count(&self, class: usize) -> usize {
        self.inner.read().freelist.len(class)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Size class for an encoded record, rejecting records no segment can hold
    fn classify(&self, len: usize) -> Result<SizeClass> {
        let class = SizeClass::for_record(len)?;
        let capacity = self.inner.read().segments.usable_capacity();
        if u64::from(class.slot_size()) > capacity {
            return Err(SlabError::InvalidInput(format!(
                "record of {} bytes needs a {}-byte slot, segments hold {}",
                len,
                class.slot_size(),
                capacity
            )));
        }
        Ok(class)
    }
}

impl StoreInner {
    /// Copy an encoded record into a reused or freshly carved slot
    fn place(&mut self, encoded: &[u8], class: SizeClass) -> Result<Handle> {
        let location = self.reserve(encoded.len(), class)?;
        self.fill(location, encoded)
    }

    /// Pick the slot for a record: best-fit free slot, else the append cursor.
    /// On error nothing has been taken.
    fn reserve(&mut self, len: usize, class: SizeClass) -> Result<Location> {
        let location = match self.freelist.acquire(class.index(), len as u32) {
            Some(reused) => reused,
            None => self
                .segments
                .advance_cursor(&mut self.end_loc, class.slot_size())?,
        };
        Ok(location.with_size_class(class.index() as u8))
    }

    fn fill(&mut self, location: Location, encoded: &[u8]) -> Result<Handle> {
        let slot = self.segments.slot_mut(location)?;
        slot[..encoded.len()].copy_from_slice(encoded);
        Ok(location.pack())
    }

    /// Header of the live record at `location`
    fn live_header(&self, location: Location) -> Result<RecordHeader> {
        let header = record::read_header(self.segments.slot(location)?)?;
        if header.kind == RecordKind::Tombstone {
            return Err(SlabError::AlreadyDeleted(location.pack()));
        }
        Ok(header)
    }

    /// Tombstone the record at `location` and reclaim its slot
    fn remove(&mut self, location: Location, scrub: bool) -> Result<()> {
        let header = self.live_header(location)?;
        self.tombstone(location, &header, scrub)
    }

    fn tombstone(&mut self, location: Location, header: &RecordHeader, scrub: bool) -> Result<()> {
        if scrub {
            self.erase_payload(location, header)?;
        }

        let tombstone = record::encode_tombstone();
        self.segments.slot_mut(location)?[..tombstone.len()].copy_from_slice(&tombstone);

        self.freelist
            .reclaim(usize::from(location.size_class()), location);
        Ok(())
    }

    /// Zero the key and value bytes behind `header`
    fn erase_payload(&mut self, location: Location, header: &RecordHeader) -> Result<()> {
        let slot = self.segments.slot_mut(location)?;
        let end = (header.total_len as usize).min(slot.len());
        if end > RECORD_HEADER_SIZE {
            slot[RECORD_HEADER_SIZE..end].fill(0);
        }
        Ok(())
    }
}
