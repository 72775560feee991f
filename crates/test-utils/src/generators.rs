//! Deterministic generators for fire records and perimeters.
//!
//! Perimeters are built around known H3 cells so tests can predict exactly
//! which cells a fire touches without going through the code under test.

use chrono::NaiveDate;
use h3o::{CellIndex, LatLng, Resolution};
use std::collections::BTreeSet;

use hex_common::{FireGeometry, FireRecord, LngLat};

use crate::fixtures::points;

/// Resolution of the end-to-end scenario.
pub const SCENARIO_RESOLUTION: u8 = 6;

fn resolution(res: u8) -> Resolution {
    Resolution::try_from(res).unwrap_or(Resolution::Six)
}

/// The cell containing `point`.
pub fn cell_at(point: LngLat, res: u8) -> CellIndex {
    match LatLng::new(point[1], point[0]) {
        Ok(ll) => ll.to_cell(resolution(res)),
        Err(e) => panic!("invalid test point {:?}: {}", point, e),
    }
}

/// `[lng, lat]` centre of a cell.
pub fn cell_centre(cell: CellIndex) -> LngLat {
    let ll = LatLng::from(cell);
    [ll.lng(), ll.lat()]
}

/// First boundary vertex of a cell, as `[lng, lat]`.
pub fn cell_vertex(cell: CellIndex) -> LngLat {
    let boundary = cell.boundary();
    let ll = boundary[0];
    [ll.lng(), ll.lat()]
}

/// Closed ring of `sides` vertices on a circle of `radius` degrees.
pub fn regular_ring(centre: LngLat, radius: f64, sides: usize) -> Vec<LngLat> {
    let mut ring: Vec<LngLat> = (0..sides)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / sides as f64;
            [centre[0] + radius * angle.cos(), centre[1] + radius * angle.sin()]
        })
        .collect();
    ring.push(ring[0]);
    ring
}

/// A small square perimeter centred in the cell containing `point`.
///
/// Returns the cell and the geometry; the square never leaves the cell.
pub fn polygon_inside_cell(point: LngLat, res: u8) -> (CellIndex, FireGeometry) {
    let cell = cell_at(point, res);
    let [x, y] = cell_centre(cell);
    let d = resolution(res).edge_length_km() / 111.32 / 20.0;
    let geometry = FireGeometry::polygon(vec![
        [x - d, y - d],
        [x + d, y - d],
        [x + d, y + d],
        [x - d, y + d],
        [x - d, y - d],
    ]);
    (cell, geometry)
}

/// An octagon around a vertex of the cell containing `point`.
///
/// Returns the cells the octagon overlaps (sampled independently, three for
/// a hexagon vertex) and the geometry.
pub fn polygon_around_vertex(point: LngLat, res: u8) -> (BTreeSet<CellIndex>, FireGeometry) {
    let vertex = cell_vertex(cell_at(point, res));
    let radius = resolution(res).edge_length_km() / 111.32 / 8.0;

    let cells = regular_ring(vertex, radius / 2.0, 24)
        .into_iter()
        .map(|p| cell_at(p, res))
        .collect();

    (cells, FireGeometry::polygon(regular_ring(vertex, radius, 8)))
}

/// FireA: 5 ha inside a single cell.
pub fn fire_a(date: NaiveDate) -> FireRecord {
    let (_, geometry) = polygon_inside_cell(points::FIRE_A, SCENARIO_RESOLUTION);
    FireRecord::point("fire-a", points::FIRE_A, 5.0, date).with_polygon(geometry)
}

/// FireB: 150 ha straddling three cells.
pub fn fire_b(date: NaiveDate) -> FireRecord {
    let (_, geometry) = polygon_around_vertex(points::FIRE_B, SCENARIO_RESOLUTION);
    FireRecord::point("fire-b", points::FIRE_B, 150.0, date).with_polygon(geometry)
}

/// FireC: 20 ha, point only.
pub fn fire_c(date: NaiveDate) -> FireRecord {
    FireRecord::point("fire-c", points::FIRE_C, 20.0, date)
}

/// FireA, FireB and FireC in that order.
pub fn scenario_records(date: NaiveDate) -> Vec<FireRecord> {
    vec![fire_a(date), fire_b(date), fire_c(date)]
}

/// Point fires spread over `bbox` with a fixed linear congruential sequence.
///
/// Areas range over `[0, 250)` ha so every size class shows up.
pub fn scattered_point_fires(
    count: usize,
    bbox: (f64, f64, f64, f64),
    seed: u64,
    date: NaiveDate,
) -> Vec<FireRecord> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let (min_x, min_y, max_x, max_y) = bbox;
    (0..count)
        .map(|i| {
            let lng = min_x + next() * (max_x - min_x);
            let lat = min_y + next() * (max_y - min_y);
            let area = next() * 250.0;
            FireRecord::point(format!("fire-{:04}", i), [lng, lat], area, date)
        })
        .collect()
}
