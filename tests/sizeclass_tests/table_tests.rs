//! Tests for the Size-Class Table
//!
//! These tests verify:
//! - Power-of-two rounding and its rejected inputs
//! - Class index mapping and clamping at both boundaries
//! - Record classification used by inserts
//! - Size-class properties over arbitrary sizes

use proptest::prelude::*;
use slabkv::sizeclass::{
    class_slot_size, max_slot_size, round_up_size, slot_class, SizeClass, FIRST_SIZECLASS,
    MAX_SIZES,
};
use slabkv::SlabError;

// =============================================================================
// round_up_size Tests
// =============================================================================

#[test]
fn test_round_up_exact_powers_unchanged() {
    for shift in 0..=31 {
        let n = 1u32 << shift;
        assert_eq!(round_up_size(n).unwrap(), n);
    }
}

#[test]
fn test_round_up_between_powers() {
    assert_eq!(round_up_size(3).unwrap(), 4);
    assert_eq!(round_up_size(17).unwrap(), 32);
    assert_eq!(round_up_size(1000).unwrap(), 1024);
    assert_eq!(round_up_size(1025).unwrap(), 2048);
}

#[test]
fn test_round_up_zero_rejected() {
    let result = round_up_size(0);
    assert!(matches!(result, Err(SlabError::InvalidInput(_))));
}

#[test]
fn test_round_up_overflow_rejected() {
    let result = round_up_size((1 << 31) + 1);
    assert!(matches!(result, Err(SlabError::InvalidInput(_))));
}

// =============================================================================
// Class Mapping Tests
// =============================================================================

#[test]
fn test_slot_class_of_first_class() {
    assert_eq!(slot_class(1 << FIRST_SIZECLASS), 0);
    assert_eq!(slot_class(1 << (FIRST_SIZECLASS + 1)), 1);
}

#[test]
fn test_class_slot_size_inverse() {
    for index in 0..MAX_SIZES {
        assert_eq!(slot_class(class_slot_size(index)), index);
    }
}

#[test]
fn test_small_sizes_clamp_to_class_zero() {
    assert_eq!(slot_class(1), 0);
    assert_eq!(slot_class(2), 0);
    assert_eq!(slot_class(8), 0);
    // Lossy: an 8-byte slot maps to a class whose slot is 16 bytes
    assert!(class_slot_size(slot_class(8)) > 8);
}

#[test]
fn test_large_sizes_clamp_to_last_class() {
    let beyond = max_slot_size() * 4;

    assert_eq!(slot_class(beyond), MAX_SIZES - 1);
    // Lossy: the last class's slot is smaller than the requested size
    assert!(class_slot_size(slot_class(beyond)) < beyond);
}

#[test]
fn test_slot_class_of_zero_is_class_zero() {
    assert_eq!(slot_class(0), 0);
}

// =============================================================================
// SizeClass::for_record Tests
// =============================================================================

#[test]
fn test_for_record_small_record_uses_class_zero() {
    let class = SizeClass::for_record(9).unwrap();
    assert_eq!(class.index(), 0);
    assert_eq!(class.slot_size(), 16);
}

#[test]
fn test_for_record_rounds_up() {
    let class = SizeClass::for_record(100).unwrap();
    assert_eq!(class.slot_size(), 128);
    assert_eq!(class.index(), 3);
}

#[test]
fn test_for_record_largest_slot_accepted() {
    let class = SizeClass::for_record(max_slot_size() as usize).unwrap();
    assert_eq!(class.index(), MAX_SIZES - 1);
}

#[test]
fn test_for_record_oversized_rejected() {
    let result = SizeClass::for_record(max_slot_size() as usize + 1);
    assert!(matches!(result, Err(SlabError::InvalidInput(_))));
}

#[test]
fn test_from_index_clamps() {
    assert_eq!(SizeClass::from_index(MAX_SIZES + 5).index(), MAX_SIZES - 1);
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #[test]
    fn prop_round_up_is_power_of_two_at_least_n(n in 1u32..=(1 << 31)) {
        let slot = round_up_size(n).unwrap();
        prop_assert!(slot.is_power_of_two());
        prop_assert!(slot >= n);
        prop_assert!(slot / 2 < n);
    }

    #[test]
    fn prop_unclamped_class_covers_slot(
        shift in FIRST_SIZECLASS..(FIRST_SIZECLASS + MAX_SIZES as u32)
    ) {
        let slot = 1u32 << shift;
        prop_assert!(class_slot_size(slot_class(slot)) >= slot);
    }

    #[test]
    fn prop_for_record_slot_holds_record(len in 1usize..=(1 << 23)) {
        let class = SizeClass::for_record(len).unwrap();
        prop_assert!(class.slot_size() as usize >= len);
        prop_assert!(class.index() < MAX_SIZES);
    }
}
