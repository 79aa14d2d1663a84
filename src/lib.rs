//! # SlabKV
//!
//! An embedded key-value engine with:
//! - Fixed-size, memory-mapped segment files
//! - Power-of-two size classes with best-fit slot reuse
//! - Opaque 64-bit handles instead of a key index
//! - Single-writer/multi-reader concurrency model
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                               │
//! │         insert / get / delete / update (RwLock)              │
//! └───────┬──────────────┬──────────────────┬───────────────────┘
//!         │              │                  │
//!         ▼              ▼                  ▼
//!   ┌───────────┐  ┌─────────────┐   ┌─────────────┐
//!   │  Record   │  │ Size Class  │   │  Free List  │
//!   │  Codec    │  │   Table     │   │  Allocator  │
//!   └───────────┘  └─────────────┘   └─────────────┘
//!                                           │
//!                                           ▼
//!   ┌───────────┐                    ┌─────────────┐
//!   │ Location  │ ◀───────────────── │  Segment    │
//!   │  Codec    │                    │  Manager    │
//!   └───────────┘                    └──────┬──────┘
//!                                           │
//!                                           ▼
//!                                    segment_000000.seg
//!                                    segment_000001.seg ...
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod location;
pub mod sizeclass;
pub mod freelist;
pub mod segment;
pub mod record;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SlabError, Result};
pub use config::Config;
pub use location::Handle;
pub use store::{Store, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SlabKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
