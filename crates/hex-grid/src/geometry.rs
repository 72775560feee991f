//! Conversions between wire geometry, `geo` types and H3 cells.
//!
//! Wire geometry is always `[lng, lat]`. h3o's `LatLng` is latitude first,
//! so every crossing of that boundary goes through this module.

use geo::{coord, Coord, LineString, MultiPolygon, Polygon};
use h3o::geom::{ContainmentMode, TilerBuilder};
use h3o::{CellIndex, LatLng, Resolution};
use std::collections::BTreeSet;

use hex_common::{FireGeometry, GridError, GridResult, HexagonCell, LngLat};

/// Validate a resolution tier and convert it to h3o's type.
pub fn parse_resolution(resolution: u8) -> GridResult<Resolution> {
    Resolution::try_from(resolution).map_err(|_| GridError::InvalidResolution(resolution))
}

fn valid_position(p: &LngLat) -> bool {
    p[0].is_finite()
        && p[1].is_finite()
        && (-180.0..=180.0).contains(&p[0])
        && (-90.0..=90.0).contains(&p[1])
}

/// Build a ring, dropping a duplicated closing vertex and rejecting rings
/// with fewer than three distinct positions.
pub fn ring_to_linestring(ring: &[LngLat]) -> GridResult<LineString> {
    if let Some(bad) = ring.iter().find(|p| !valid_position(p)) {
        return Err(GridError::generation(format!(
            "invalid position [{}, {}]",
            bad[0], bad[1]
        )));
    }

    let open = match ring.split_last() {
        Some((last, rest)) if Some(last) == rest.first() => rest,
        _ => ring,
    };
    if open.len() < 3 {
        return Err(GridError::generation(format!(
            "ring has {} distinct positions, need at least 3",
            open.len()
        )));
    }

    let coords: Vec<Coord> = open.iter().map(|p| coord! { x: p[0], y: p[1] }).collect();
    // Polygon::new closes the ring.
    Ok(LineString::from(coords))
}

/// Exterior ring first, holes after. Unusable holes are dropped.
pub fn rings_to_polygon(rings: &[Vec<LngLat>]) -> GridResult<Polygon> {
    let (exterior, holes) = rings
        .split_first()
        .ok_or_else(|| GridError::generation("polygon without exterior ring"))?;

    let exterior = ring_to_linestring(exterior)?;
    let interiors = holes
        .iter()
        .filter_map(|hole| ring_to_linestring(hole).ok())
        .collect();

    Ok(Polygon::new(exterior, interiors))
}

/// Convert a fire perimeter, keeping every polygon that converts cleanly.
pub fn fire_geometry_to_multipolygon(geometry: &FireGeometry) -> GridResult<MultiPolygon> {
    let mut polygons = Vec::with_capacity(geometry.polygons.len());
    let mut last_error = None;

    for rings in &geometry.polygons {
        match rings_to_polygon(rings) {
            Ok(polygon) => polygons.push(polygon),
            Err(e) => last_error = Some(e),
        }
    }

    if polygons.is_empty() {
        return Err(last_error.unwrap_or_else(|| GridError::generation("empty geometry")));
    }
    Ok(MultiPolygon::new(polygons))
}

/// Cells of `area` at `resolution` according to `mode`.
///
/// An empty area yields an empty set.
pub fn cover_area(
    area: &MultiPolygon,
    resolution: Resolution,
    mode: ContainmentMode,
) -> GridResult<BTreeSet<CellIndex>> {
    let polygons: Vec<Polygon> = area
        .0
        .iter()
        .filter(|p| p.exterior().0.len() >= 4)
        .cloned()
        .collect();
    if polygons.is_empty() {
        return Ok(BTreeSet::new());
    }

    let mut tiler = TilerBuilder::new(resolution)
        .containment_mode(mode)
        .build();
    tiler
        .add_batch(polygons)
        .map_err(|e| GridError::generation(format!("tiler rejected polygon: {}", e)))?;

    Ok(tiler.into_coverage().collect())
}

/// The cell containing a `[lng, lat]` point.
pub fn locate_point(point: LngLat, resolution: Resolution) -> GridResult<CellIndex> {
    let latlng = LatLng::new(point[1], point[0]).map_err(|e| {
        GridError::validation("point", format!("[{}, {}]: {}", point[0], point[1], e))
    })?;
    Ok(latlng.to_cell(resolution))
}

/// Closed `[lng, lat]` boundary ring of a cell.
pub fn cell_boundary(cell: CellIndex) -> Vec<LngLat> {
    let boundary = cell.boundary();
    let mut ring: Vec<LngLat> = boundary.iter().map(|ll| [ll.lng(), ll.lat()]).collect();
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}

/// Wire representation of a cell.
pub fn hexagon_cell(cell: CellIndex) -> HexagonCell {
    HexagonCell::new(
        cell.to_string(),
        cell_boundary(cell),
        u8::from(cell.resolution()),
    )
}
