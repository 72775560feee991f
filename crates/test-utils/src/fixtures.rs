//! Common test fixtures for fire hexgrid tests.
//!
//! Positions are `[lng, lat]` and lie inside the built-in mainland
//! Portugal coverage unless noted otherwise.

/// Viewports as `(min_lng, min_lat, max_lng, max_lat)`.
pub mod viewport {
    /// Half-degree square in central Portugal, fully inside the coverage.
    pub const CENTRAL: (f64, f64, f64, f64) = (-8.5, 39.0, -8.0, 39.5);

    /// Square around the FireB test vertex in the north-east.
    pub const NORTH_EAST: (f64, f64, f64, f64) = (-7.7, 40.3, -7.3, 40.7);

    /// Straddles the Atlantic coast; only part of it is covered.
    pub const COASTAL: (f64, f64, f64, f64) = (-10.0, 38.5, -9.0, 39.0);

    /// Open Atlantic, no overlap with the coverage.
    pub const OCEAN: (f64, f64, f64, f64) = (-20.0, 30.0, -15.0, 33.0);

    /// min > max.
    pub const INVALID: (f64, f64, f64, f64) = (-7.0, 40.0, -8.0, 41.0);
}

/// Reference points for the end-to-end scenario.
pub mod points {
    use hex_common::LngLat;

    /// Centre of FireA's cell.
    pub const FIRE_A: LngLat = [-8.0, 39.5];

    /// Near the vertex FireB straddles.
    pub const FIRE_B: LngLat = [-7.5, 40.5];

    /// FireC, point-only.
    pub const FIRE_C: LngLat = [-7.9, 38.5];

    /// Outside the coverage, in the Atlantic.
    pub const OCEAN: LngLat = [-12.0, 39.0];
}

/// Dates used across tests.
pub mod dates {
    use chrono::NaiveDate;

    /// 2024-08-`day`.
    pub fn august(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, day).unwrap()
    }
}
