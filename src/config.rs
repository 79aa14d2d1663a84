//! Configuration for SlabKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SlabError};
use crate::location::MAX_SLOT_POSITION;
use crate::segment::{MAX_FILESIZE, SEGMENT_HEADER_SIZE};
use crate::sizeclass::class_slot_size;

/// Main configuration for a SlabKV store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory holding the segment files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── segment_000000.seg
    ///     ├── segment_000001.seg
    ///     └── ...
    pub data_dir: PathBuf,

    /// Write zeros into new segments instead of sizing them sparsely
    pub preallocate: bool,

    /// Capacity of every segment file in bytes
    pub segment_size: u64,

    // -------------------------------------------------------------------------
    // Delete Configuration
    // -------------------------------------------------------------------------
    /// Zero a record's key and value bytes when it is deleted
    pub scrub_on_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./slabkv_data"),
            preallocate: false,
            segment_size: MAX_FILESIZE, // 64 MB
            scrub_on_delete: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Convert a segment size given in KiB to bytes
    pub fn segment_size_from_kb(kb: u64) -> Result<u64> {
        kb.checked_mul(1024).ok_or_else(|| {
            SlabError::Config(format!("segment size of {} KB overflows u64", kb))
        })
    }

    /// Reject segment sizes that cannot hold a single slot or that a
    /// location cannot address
    pub fn validate(&self) -> Result<()> {
        let min = SEGMENT_HEADER_SIZE + u64::from(class_slot_size(0));
        if self.segment_size < min {
            return Err(SlabError::Config(format!(
                "segment_size {} is below the minimum {}",
                self.segment_size, min
            )));
        }
        if self.segment_size > MAX_SLOT_POSITION {
            return Err(SlabError::Config(format!(
                "segment_size {} exceeds the addressable maximum {}",
                self.segment_size, MAX_SLOT_POSITION
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all segments)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Physically zero-fill new segments
    pub fn preallocate(mut self, preallocate: bool) -> Self {
        self.config.preallocate = preallocate;
        self
    }

    /// Set the segment capacity (in bytes)
    pub fn segment_size(mut self, size: u64) -> Self {
        self.config.segment_size = size;
        self
    }

    /// Zero deleted payloads instead of only rewriting the header
    pub fn scrub_on_delete(mut self, scrub: bool) -> Self {
        self.config.scrub_on_delete = scrub;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
