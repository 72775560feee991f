//! Tests for viewport bounding boxes and region keys.

use hex_common::bbox::{BboxParseError, BoundingBox};
use hex_common::{GridError, Region};

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_viewport_with_spaces() {
    let bbox = BoundingBox::from_viewport_string(" -9.5, 38.5 ,-8.9,39.0").unwrap();
    assert!((bbox.min_x - (-9.5)).abs() < 1e-12);
    assert!((bbox.max_y - 39.0).abs() < 1e-12);
}

#[test]
fn test_parse_viewport_too_few() {
    let result = BoundingBox::from_viewport_string("0,0,1");
    assert!(matches!(result, Err(BboxParseError::InvalidFormat(_))));
}

#[test]
fn test_parse_viewport_not_a_number() {
    let result = BoundingBox::from_viewport_string("0,0,east,1");
    assert!(matches!(result, Err(BboxParseError::InvalidNumber(_))));
}

#[test]
fn test_parse_error_converts_to_invalid_bbox() {
    let err: GridError = BoundingBox::from_viewport_string("x").unwrap_err().into();
    assert!(matches!(err, GridError::InvalidBbox(_)));
    assert!(err.is_validation());
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_accepts_portugal_viewport() {
    assert!(BoundingBox::new(-9.6, 36.9, -6.1, 42.2).validate().is_ok());
}

#[test]
fn test_validate_rejects_inverted() {
    let err = BoundingBox::new(-8.0, 40.0, -9.0, 41.0).validate().unwrap_err();
    assert!(matches!(err, GridError::InvalidBbox(_)));
}

#[test]
fn test_validate_rejects_degenerate() {
    assert!(BoundingBox::new(-8.0, 40.0, -8.0, 41.0).validate().is_err());
}

#[test]
fn test_validate_rejects_out_of_range() {
    assert!(BoundingBox::new(-181.0, 0.0, 0.0, 1.0).validate().is_err());
    assert!(BoundingBox::new(0.0, -91.0, 1.0, 1.0).validate().is_err());
}

#[test]
fn test_validate_rejects_nan() {
    assert!(BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0).validate().is_err());
}

// ============================================================================
// Region keys
// ============================================================================

#[test]
fn test_nearby_viewports_share_a_key() {
    let a = Region::viewport(-9.2012, 38.6049, -9.0003, 38.8001);
    let b = Region::viewport(-9.1998, 38.5951, -8.9996, 38.7999);
    assert_eq!(a.cache_key(2), b.cache_key(2));
}

#[test]
fn test_distinct_viewports_have_distinct_keys() {
    let a = Region::viewport(-9.2, 38.6, -9.0, 38.8);
    let b = Region::viewport(-9.2, 38.6, -9.0, 38.9);
    assert_ne!(a.cache_key(2), b.cache_key(2));
}

#[test]
fn test_canonical_viewport_matches_key() {
    let region = Region::viewport(-9.2012, 38.6049, -9.0003, 38.8001);
    let canonical = region.canonical(2);
    assert_eq!(canonical, Region::viewport(-9.2, 38.6, -9.0, 38.8));
    assert_eq!(canonical.cache_key(2), region.cache_key(2));
}

#[test]
fn test_global_region_is_always_valid() {
    assert!(Region::Global.validate().is_ok());
    assert_eq!(Region::Global.canonical(4), Region::Global);
}

#[test]
fn test_viewport_narrower_than_precision_stays_valid() {
    // Both axes narrower than 0.01 degrees.
    let region = Region::viewport(-8.2003, 39.2001, -8.2001, 39.2004);
    let canonical = region.canonical(2);
    assert!(canonical.validate().is_ok());
    assert_eq!(canonical, Region::viewport(-8.21, 39.2, -8.2, 39.21));
    assert_eq!(canonical.cache_key(2), region.cache_key(2));
}

#[test]
fn test_viewport_straddling_a_rounding_boundary() {
    // Corners round to neighbouring quanta, nothing to widen.
    let region = Region::viewport(-8.0051, 39.2049, -8.0049, 39.2051);
    let canonical = region.canonical(2);
    assert!(canonical.validate().is_ok());
    assert_eq!(canonical, Region::viewport(-8.01, 39.2, -8.0, 39.21));
}
