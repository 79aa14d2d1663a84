//! Segment Manager
//!
//! Owns every mapped segment of a store and turns locations into bytes.
//!
//! ## Responsibilities
//! - Start a fresh segment set in the data directory
//! - Create the next segment when the append cursor overflows
//! - Resolve locations to bounds-checked slot spans
//! - Release every mapping exactly once (on drop)

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::location::{Location, MAX_SEGMENTS, MAX_SLOT_POSITION};
use crate::sizeclass::{class_slot_size, MAX_SIZES};
use crate::SlabError;

use super::{Segment, SEGMENT_HEADER_SIZE};

/// Manages the mapped segments of one store
pub struct SegmentManager {
    /// Directory holding the segment files
    data_dir: PathBuf,

    /// Capacity of every segment in bytes
    segment_size: u64,

    /// Physically zero-fill new segments instead of sizing them sparsely
    preallocate: bool,

    /// Mapped segments, indexed by segment id
    segments: Vec<Segment>,
}

impl SegmentManager {
    /// Open a fresh segment set in the given directory
    ///
    /// On startup:
    /// 1. Create directory if it doesn't exist
    /// 2. Remove segment files left behind by an earlier store
    /// 3. Create and map segment 0
    pub fn open(path: &Path, segment_size: u64, preallocate: bool) -> Result<Self> {
        if segment_size <= SEGMENT_HEADER_SIZE || segment_size > MAX_SLOT_POSITION {
            return Err(SlabError::Config(format!(
                "segment size {} must be in ({}, {}]",
                segment_size, SEGMENT_HEADER_SIZE, MAX_SLOT_POSITION
            )));
        }

        fs::create_dir_all(path)?;

        // Nothing is recovered from old segments, so they only waste space
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let file_path = entry.path();

            if file_path.is_file() && Self::parse_segment_id(&file_path).is_some() {
                debug!(path = %file_path.display(), "removing stale segment");
                fs::remove_file(&file_path)?;
            }
        }

        let mut manager = Self {
            data_dir: path.to_path_buf(),
            segment_size,
            preallocate,
            segments: Vec::new(),
        };
        manager.open_or_create(0)?;

        Ok(manager)
    }

    /// Return segment `segment_id`, creating and mapping it (and any missing
    /// segment before it) if it is not mapped yet
    pub fn open_or_create(&mut self, segment_id: u32) -> Result<&Segment> {
        if segment_id >= MAX_SEGMENTS {
            return Err(SlabError::SegmentLimit(segment_id));
        }

        while self.segments.len() <= segment_id as usize {
            let id = self.segments.len() as u16;
            let path = self.segment_path(id);
            let segment = Segment::create(&path, id, self.segment_size, self.preallocate)?;
            self.segments.push(segment);
        }

        Ok(&self.segments[segment_id as usize])
    }

    /// Location of the first usable slot of segment 0, with class 0
    pub fn first_location(&self) -> Location {
        Location::new(0, SEGMENT_HEADER_SIZE, 0)
    }

    /// Reserve `slot_size` bytes at the append cursor.
    ///
    /// If the slot would end past the segment capacity the next segment is
    /// created and the slot is placed at its first usable position. Either
    /// way `end_loc` moves to just past the reserved slot and the returned
    /// location (size class 0; the caller stamps the real class) is where
    /// the record goes.
    pub fn advance_cursor(&mut self, end_loc: &mut Location, slot_size: u32) -> Result<Location> {
        let slot = u64::from(slot_size);
        if slot > self.usable_capacity() {
            return Err(SlabError::InvalidInput(format!(
                "slot of {} bytes does not fit in a {}-byte segment",
                slot, self.segment_size
            )));
        }

        let projected = end_loc.slot_position() + slot;
        let at = if projected > self.segment_size {
            let next = u32::from(end_loc.segment_id()) + 1;
            self.open_or_create(next)?;
            info!(
                segment = next,
                count = self.segments.len(),
                "segment full, rolled over"
            );
            Location::new(next as u16, SEGMENT_HEADER_SIZE, 0)
        } else {
            Location::new(end_loc.segment_id(), end_loc.slot_position(), 0)
        };

        *end_loc = at.with_slot_position(at.slot_position() + slot);
        Ok(at)
    }

    /// The slot bytes a location addresses (`class_slot_size` bytes)
    pub fn slot(&self, location: Location) -> Result<&[u8]> {
        let len = Self::slot_len(location)?;
        self.segments
            .get(usize::from(location.segment_id()))
            .and_then(|segment| segment.span(location.slot_position(), len))
            .ok_or(SlabError::InvalidHandle(location.pack()))
    }

    /// Mutable slot bytes a location addresses
    pub fn slot_mut(&mut self, location: Location) -> Result<&mut [u8]> {
        let len = Self::slot_len(location)?;
        self.segments
            .get_mut(usize::from(location.segment_id()))
            .and_then(|segment| segment.span_mut(location.slot_position(), len))
            .ok_or(SlabError::InvalidHandle(location.pack()))
    }

    /// Write dirty pages of every segment back to disk
    pub fn flush(&self) -> Result<()> {
        for segment in &self.segments {
            segment.flush()?;
        }
        Ok(())
    }

    /// Get a mapped segment by id
    pub fn segment(&self, segment_id: u16) -> Option<&Segment> {
        self.segments.get(usize::from(segment_id))
    }

    /// Get the number of mapped segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Get the capacity of each segment
    pub fn segment_size(&self) -> u64 {
        self.segment_size
    }

    /// Bytes available for slots in each segment
    pub fn usable_capacity(&self) -> u64 {
        self.segment_size - SEGMENT_HEADER_SIZE
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Generate the file path for a segment with given ID
    pub fn segment_path(&self, id: u16) -> PathBuf {
        Self::segment_path_with_dir(&self.data_dir, id)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Slot length for a location the engine could have issued
    fn slot_len(location: Location) -> Result<u64> {
        let class = usize::from(location.size_class());
        if class >= MAX_SIZES || location.slot_position() < SEGMENT_HEADER_SIZE {
            return Err(SlabError::InvalidHandle(location.pack()));
        }
        Ok(u64::from(class_slot_size(class)))
    }

    /// Generate segment path given a directory and ID
    fn segment_path_with_dir(dir: &Path, id: u16) -> PathBuf {
        dir.join(format!("segment_{:06}.seg", id))
    }

    /// Parse segment ID from filename
    /// "segment_000042.seg" → Some(42)
    fn parse_segment_id(path: &Path) -> Option<u16> {
        if path.extension()? != "seg" {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy();
        let id_str = name.strip_prefix("segment_")?;
        id_str.parse().ok()
    }
}
