//! Tests for SegmentManager
//!
//! These tests verify:
//! - Opening/creating the data directory and segment 0
//! - Segment file size, zero fill and header
//! - Cursor advance and rollover into new segments
//! - Bounds-checked slot resolution

use std::fs;
use std::path::PathBuf;

use slabkv::location::Location;
use slabkv::segment::{SegmentManager, SEGMENT_HEADER_SIZE};
use slabkv::SlabError;
use tempfile::TempDir;

const SEGMENT_SIZE: u64 = 4096;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().to_path_buf();
    (temp_dir, path)
}

// =============================================================================
// Open/Create Tests
// =============================================================================

#[test]
fn test_open_creates_directory_and_first_segment() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("new_store");

    assert!(!path.exists());

    let manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();

    assert!(path.is_dir());
    assert_eq!(manager.segment_count(), 1);
    assert!(manager.segment_path(0).exists());
    assert_eq!(manager.segment_path(0), path.join("segment_000000.seg"));
}

#[test]
fn test_segment_file_has_exact_size() {
    let (_temp, path) = setup_temp_dir();

    for preallocate in [false, true] {
        let manager = SegmentManager::open(&path, SEGMENT_SIZE, preallocate).unwrap();
        let len = fs::metadata(manager.segment_path(0)).unwrap().len();
        assert_eq!(len, SEGMENT_SIZE);
    }
}

#[test]
fn test_segment_is_zero_filled_after_header() {
    let (_temp, path) = setup_temp_dir();
    let manager = SegmentManager::open(&path, SEGMENT_SIZE, true).unwrap();
    manager.flush().unwrap();

    let bytes = fs::read(manager.segment_path(0)).unwrap();

    assert_eq!(&bytes[0..4], b"SLKV");
    assert!(bytes[SEGMENT_HEADER_SIZE as usize..].iter().all(|&b| b == 0));
}

#[test]
fn test_segment_header_verifies() {
    let (_temp, path) = setup_temp_dir();
    let mut manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();
    manager.open_or_create(2).unwrap();

    for id in 0..3 {
        let segment = manager.segment(id).unwrap();
        assert_eq!(segment.id(), id);
        assert_eq!(segment.len(), SEGMENT_SIZE);
        segment.verify_header().unwrap();
    }
}

#[test]
fn test_open_removes_stale_segments() {
    let (_temp, path) = setup_temp_dir();

    {
        let mut manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();
        manager.open_or_create(3).unwrap();
        assert_eq!(manager.segment_count(), 4);
    }

    fs::write(path.join("notes.txt"), b"keep me").unwrap();

    let manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();

    assert_eq!(manager.segment_count(), 1);
    assert!(!path.join("segment_000001.seg").exists());
    assert!(!path.join("segment_000003.seg").exists());
    assert!(path.join("notes.txt").exists());
}

#[test]
fn test_open_rejects_tiny_segments() {
    let (_temp, path) = setup_temp_dir();
    let result = SegmentManager::open(&path, SEGMENT_HEADER_SIZE, false);
    assert!(matches!(result, Err(SlabError::Config(_))));
}

#[test]
fn test_open_or_create_existing_is_noop() {
    let (_temp, path) = setup_temp_dir();
    let mut manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();

    manager.open_or_create(0).unwrap();
    assert_eq!(manager.segment_count(), 1);
}

#[test]
fn test_open_or_create_beyond_limit() {
    let (_temp, path) = setup_temp_dir();
    let mut manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();

    let result = manager.open_or_create(1 << 16);
    assert!(matches!(result, Err(SlabError::SegmentLimit(65536))));
}

// =============================================================================
// Cursor Tests
// =============================================================================

#[test]
fn test_advance_cursor_within_segment() {
    let (_temp, path) = setup_temp_dir();
    let mut manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();
    let mut end = manager.first_location();

    let first = manager.advance_cursor(&mut end, 64).unwrap();
    let second = manager.advance_cursor(&mut end, 32).unwrap();

    assert_eq!(first.segment_id(), 0);
    assert_eq!(first.slot_position(), SEGMENT_HEADER_SIZE);
    assert_eq!(second.slot_position(), SEGMENT_HEADER_SIZE + 64);
    assert_eq!(end.slot_position(), SEGMENT_HEADER_SIZE + 96);
    assert_eq!(manager.segment_count(), 1);
}

#[test]
fn test_advance_cursor_rolls_over_exactly_once() {
    let (_temp, path) = setup_temp_dir();
    let mut manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();
    let mut end = manager.first_location();

    // (4096 - 16) / 1024 = 3 full slots fit in segment 0
    let mut segments = Vec::new();
    for _ in 0..5 {
        segments.push(manager.advance_cursor(&mut end, 1024).unwrap());
    }

    let ids: Vec<u16> = segments.iter().map(|l| l.segment_id()).collect();
    assert_eq!(ids, vec![0, 0, 0, 1, 1]);
    assert_eq!(segments[3].slot_position(), SEGMENT_HEADER_SIZE);
    assert_eq!(manager.segment_count(), 2);
    assert!(manager.segment_path(1).exists());
}

#[test]
fn test_advance_cursor_fills_segment_to_the_last_byte() {
    let (_temp, path) = setup_temp_dir();
    let mut manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();
    let mut end = manager.first_location();

    // 16 + 255 * 16 = 4096: the final slot ends exactly at the boundary
    for _ in 0..255 {
        let at = manager.advance_cursor(&mut end, 16).unwrap();
        assert_eq!(at.segment_id(), 0);
    }
    assert_eq!(end.slot_position(), SEGMENT_SIZE);

    let next = manager.advance_cursor(&mut end, 16).unwrap();
    assert_eq!(next.segment_id(), 1);
}

#[test]
fn test_advance_cursor_rejects_slot_larger_than_segment() {
    let (_temp, path) = setup_temp_dir();
    let mut manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();
    let mut end = manager.first_location();

    let result = manager.advance_cursor(&mut end, 4096);

    assert!(matches!(result, Err(SlabError::InvalidInput(_))));
    assert_eq!(end, manager.first_location());
    assert_eq!(manager.segment_count(), 1);
}

// =============================================================================
// Slot Resolution Tests
// =============================================================================

#[test]
fn test_slot_length_follows_size_class() {
    let (_temp, path) = setup_temp_dir();
    let manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();

    assert_eq!(manager.slot(Location::new(0, 16, 0)).unwrap().len(), 16);
    assert_eq!(manager.slot(Location::new(0, 16, 3)).unwrap().len(), 128);
}

#[test]
fn test_slot_write_is_visible_to_reads() {
    let (_temp, path) = setup_temp_dir();
    let mut manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();
    let location = Location::new(0, 32, 0);

    manager.slot_mut(location).unwrap()[..5].copy_from_slice(b"hello");

    assert_eq!(&manager.slot(location).unwrap()[..5], b"hello");
}

#[test]
fn test_slot_out_of_range() {
    let (_temp, path) = setup_temp_dir();
    let manager = SegmentManager::open(&path, SEGMENT_SIZE, false).unwrap();

    let cases = [
        Location::new(1, 16, 0),             // unmapped segment
        Location::new(0, SEGMENT_SIZE, 0),   // past the end
        Location::new(0, 4000, 3),           // span crosses the end
        Location::new(0, 0, 0),              // inside the header
        Location::new(0, 16, 200),           // class never issued
    ];

    for location in cases {
        let result = manager.slot(location);
        assert!(
            matches!(result, Err(SlabError::InvalidHandle(_))),
            "{:?} should be rejected",
            location
        );
    }
}
