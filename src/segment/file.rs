//! Segment file
//!
//! A single zero-filled backing file and its read/write mapping.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap2::MmapMut;
use tracing::debug;

use crate::error::Result;
use crate::SlabError;

use super::{MAGIC, SEGMENT_HEADER_SIZE, VERSION};

/// Chunk used when physically writing zeros into a preallocated segment
const ZERO_CHUNK: usize = 64 * 1024;

/// One mapped segment file
///
/// The mapping lives exactly as long as this value. Dropping it unmaps the
/// region and then closes the descriptor.
pub struct Segment {
    /// Read/write shared mapping of the whole file
    mmap: MmapMut,
    /// Descriptor backing the mapping
    _file: File,
    /// Segment number
    id: u16,
    /// Path of the backing file
    path: PathBuf,
}

impl Segment {
    /// Create (truncating) a zero-filled file of exactly `size` bytes, map it
    /// and stamp the segment header, read back through the mapping.
    ///
    /// With `preallocate` the zeros are written out so the file is fully
    /// backed on disk; otherwise it is sized with `set_len`.
    pub fn create(path: &Path, id: u16, size: u64, preallocate: bool) -> Result<Self> {
        if size <= SEGMENT_HEADER_SIZE {
            return Err(SlabError::Config(format!(
                "segment size {} leaves no room after the {}-byte header",
                size, SEGMENT_HEADER_SIZE
            )));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        if preallocate {
            let zeros = vec![0u8; ZERO_CHUNK];
            let mut writer = BufWriter::new(&file);
            let mut remaining = size;
            while remaining > 0 {
                let n = remaining.min(ZERO_CHUNK as u64) as usize;
                writer.write_all(&zeros[..n])?;
                remaining -= n as u64;
            }
            writer.flush()?;
        } else {
            file.set_len(size)?;
        }

        // SAFETY: the file was just created by this process and is owned by
        // the returned Segment; nothing else resizes or truncates it while
        // the mapping is alive.
        let mmap = unsafe { MmapMut::map_mut(&file)? };

        let mut segment = Self {
            mmap,
            _file: file,
            id,
            path: path.to_path_buf(),
        };
        segment.write_header();
        segment.verify_header()?;

        debug!(
            segment = id,
            path = %path.display(),
            size,
            preallocate,
            "created segment"
        );

        Ok(segment)
    }

    /// Segment number
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mapped size in bytes
    pub fn len(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// Check if the mapping is empty
    pub fn is_empty(&self) -> bool {
        self.mmap.is_empty()
    }

    /// Bytes `[offset, offset + len)`, or `None` if the range leaves the
    /// segment
    pub fn span(&self, offset: u64, len: u64) -> Option<&[u8]> {
        let (start, end) = self.bounds(offset, len)?;
        Some(&self.mmap[start..end])
    }

    /// Mutable bytes `[offset, offset + len)`, or `None` if the range leaves
    /// the segment
    pub fn span_mut(&mut self, offset: u64, len: u64) -> Option<&mut [u8]> {
        let (start, end) = self.bounds(offset, len)?;
        Some(&mut self.mmap[start..end])
    }

    /// Synchronously write dirty pages back to the file
    pub fn flush(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }

    /// Check the header magic, version and segment number
    pub fn verify_header(&self) -> Result<()> {
        let header = &self.mmap[..SEGMENT_HEADER_SIZE as usize];

        if &header[0..4] != MAGIC {
            return Err(SlabError::CorruptRecord(format!(
                "invalid segment magic in {}: {:?}",
                self.path.display(),
                &header[0..4]
            )));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(SlabError::CorruptRecord(format!(
                "unsupported segment version {} in {}",
                version,
                self.path.display()
            )));
        }

        let id = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
        if id != u32::from(self.id) {
            return Err(SlabError::CorruptRecord(format!(
                "segment {} carries id {}",
                self.id, id
            )));
        }

        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn bounds(&self, offset: u64, len: u64) -> Option<(usize, usize)> {
        let end = offset.checked_add(len)?;
        if end > self.len() {
            return None;
        }
        Some((offset as usize, end as usize))
    }

    fn write_header(&mut self) {
        let header = &mut self.mmap[..SEGMENT_HEADER_SIZE as usize];
        header[0..4].copy_from_slice(MAGIC);
        header[4..6].copy_from_slice(&VERSION.to_le_bytes());
        header[8..12].copy_from_slice(&u32::from(self.id).to_le_bytes());
    }
}
