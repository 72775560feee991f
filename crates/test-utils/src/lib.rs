//! Shared test utilities for the fire hexgrid workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Fixtures (viewports, dates, inland points of the coverage area)
//! - Deterministic generators for fire perimeters around known H3 cells
//! - Storage test doubles
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, polygon_inside_cell};
//! ```

pub mod doubles;
pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use doubles::*;
pub use generators::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Approximate equality of two `[lng, lat]` positions.
///
/// ```ignore
/// use test_utils::assert_lnglat_approx_eq;
///
/// assert_lnglat_approx_eq!([-8.0001, 39.5], [-8.0, 39.5], 0.001);
/// ```
#[macro_export]
macro_rules! assert_lnglat_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: [f64; 2] = $left;
        let right: [f64; 2] = $right;
        $crate::assert_approx_eq!(left[0], right[0], $epsilon);
        $crate::assert_approx_eq!(left[1], right[1], $epsilon);
    }};
}
