//! Error types for SlabKV
//!
//! Provides a unified error type for all store operations.

use thiserror::Error;

use crate::location::Handle;

/// Result type alias using SlabError
pub type Result<T> = std::result::Result<T, SlabError>;

/// Unified error type for SlabKV operations
#[derive(Debug, Error)]
pub enum SlabError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Input Errors
    // -------------------------------------------------------------------------
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    #[error("Record not found: {0}")]
    NotFound(Handle),

    #[error("Record already deleted: {0}")]
    AlreadyDeleted(Handle),

    // -------------------------------------------------------------------------
    // Segment Errors
    // -------------------------------------------------------------------------
    #[error("Handle does not address a mapped slot: {0}")]
    InvalidHandle(Handle),

    #[error("Segment limit reached: cannot create segment {0}")]
    SegmentLimit(u32),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
