//! Attribution of fire records to grid cells.
//!
//! Polygon fires are split evenly across every cell their perimeter covers
//! at the grid's resolution, and only the shares of cells present in the
//! grid are credited. A cell therefore gets the same value whatever the
//! viewport. Fires without a usable perimeter, or whose perimeter cannot be
//! covered, are attributed in full to the cell of their centroid. Fires
//! with no cell in the grid are counted in the totals but not in any cell.

use h3o::Resolution;
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

use hex_common::{
    AggregationResult, AggregationScope, CellAggregate, FireGeometry, FireRecord, Grid,
    GridError, GridResult,
};
use hex_grid::geometry::{cover_area, fire_geometry_to_multipolygon, locate_point, parse_resolution};
use hex_grid::CoverMode;

/// Bins fire records onto an existing grid.
#[derive(Debug, Clone, Copy)]
pub struct FireBinner {
    mode: CoverMode,
}

impl Default for FireBinner {
    fn default() -> Self {
        Self {
            mode: CoverMode::Covers,
        }
    }
}

impl FireBinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binner selecting perimeter cells with `mode`.
    pub fn with_mode(mode: CoverMode) -> Self {
        Self { mode }
    }

    /// Aggregate `records` onto `grid`.
    ///
    /// Every grid cell appears in `per_cell`, including cells without fires.
    /// Output depends only on the grid and the records in input order.
    #[instrument(skip_all, fields(resolution = grid.resolution, cells = grid.len(), records = records.len()))]
    pub fn bin(&self, grid: &Grid, records: &[FireRecord], scope: AggregationScope) -> AggregationResult {
        let mut result = AggregationResult::empty(grid.resolution, scope);
        result.per_cell = grid
            .cells
            .iter()
            .map(|cell| (cell.id.clone(), CellAggregate::empty(cell.id.clone())))
            .collect::<BTreeMap<_, _>>();

        result.total_fires = records.len();
        result.total_area_hectares = records.iter().map(FireRecord::effective_area).sum();

        let resolution = match parse_resolution(grid.resolution) {
            Ok(res) => res,
            Err(e) => {
                warn!(error = %e, "Grid has an invalid resolution, nothing binned");
                result.dropped_fires = records.len();
                return result;
            }
        };

        for record in records {
            let footprint = self.footprint(record, resolution);
            let in_grid: Vec<&String> = footprint
                .iter()
                .filter(|id| grid.contains_cell(id))
                .collect();
            if in_grid.is_empty() {
                debug!(fire_id = %record.id, "Fire outside grid, dropped from cells");
                result.dropped_fires += 1;
                continue;
            }

            let share = record.effective_area() / footprint.len() as f64;
            for cell_id in in_grid {
                if let Some(cell) = result.per_cell.get_mut(cell_id) {
                    cell.attribute(&record.id, share);
                }
            }
            result.binned_fires += 1;
        }

        for cell in result.per_cell.values_mut() {
            cell.classify();
        }

        debug!(
            binned = result.binned_fires,
            dropped = result.dropped_fires,
            "Binned fire records"
        );
        result
    }

    /// Every cell a record occupies at `resolution`, sorted, whether or not
    /// the grid holds it. Empty only for an unusable centroid.
    fn footprint(&self, record: &FireRecord, resolution: Resolution) -> Vec<String> {
        if let Some(geometry) = record.usable_polygon() {
            match self.polygon_cells(record, geometry, resolution) {
                Ok(cells) if !cells.is_empty() => return cells,
                Ok(_) => {
                    debug!(fire_id = %record.id, "Perimeter covers no cells, using centroid");
                }
                Err(e) => {
                    warn!(fire_id = %record.id, error = %e, "Perimeter binning failed, using centroid");
                }
            }
        }

        match locate_point(record.centroid, resolution) {
            Ok(cell) => vec![cell.to_string()],
            Err(e) => {
                warn!(fire_id = %record.id, error = %e, "Invalid centroid");
                Vec::new()
            }
        }
    }

    fn polygon_cells(
        &self,
        record: &FireRecord,
        geometry: &FireGeometry,
        resolution: Resolution,
    ) -> GridResult<Vec<String>> {
        let area = fire_geometry_to_multipolygon(geometry)
            .map_err(|e| GridError::binning(&record.id, e.to_string()))?;
        let cells = cover_area(&area, resolution, self.mode.containment_mode())
            .map_err(|e| GridError::binning(&record.id, e.to_string()))?;
        Ok(cells.into_iter().map(|c| c.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_common::{HexagonCell, Region, SizeClass};
    use hex_grid::geometry::hexagon_cell;
    use test_utils::fixtures::{dates::august, points};
    use test_utils::{cell_at, polygon_around_vertex, polygon_inside_cell};

    fn snapshot() -> AggregationScope {
        AggregationScope::Snapshot { date: None }
    }

    /// Grid made of the given cells only.
    fn grid_of(cells: impl IntoIterator<Item = h3o::CellIndex>) -> Grid {
        let cells: Vec<HexagonCell> = cells.into_iter().map(hexagon_cell).collect();
        Grid::new(6, cells, Region::Global)
    }

    #[test]
    fn test_polygon_inside_one_cell_gets_full_area() {
        let (cell, geometry) = polygon_inside_cell(points::FIRE_A, 6);
        let grid = grid_of([cell]);
        let fire = FireRecord::point("a", points::FIRE_A, 5.0, august(1)).with_polygon(geometry);

        let result = FireBinner::new().bin(&grid, &[fire], snapshot());
        let agg = &result.per_cell[&cell.to_string()];
        assert_eq!(agg.total_area_hectares, 5.0);
        assert_eq!(agg.fire_count, 1);
        assert_eq!(agg.size_class, SizeClass::Small);
    }

    #[test]
    fn test_area_split_evenly_and_conserved() {
        let (cells, geometry) = polygon_around_vertex(points::FIRE_B, 6);
        let grid = grid_of(cells.iter().copied());
        let fire = FireRecord::point("b", points::FIRE_B, 150.0, august(1)).with_polygon(geometry);

        let result = FireBinner::new().bin(&grid, &[fire], snapshot());
        assert_eq!(result.active_cells().count(), 3);
        for agg in result.active_cells() {
            assert!((agg.total_area_hectares - 50.0).abs() < 1e-9);
            assert_eq!(agg.size_class, SizeClass::Medium);
        }
        assert!((result.attributed_area() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_overlap_keeps_share_of_full_covering() {
        let (cells, geometry) = polygon_around_vertex(points::FIRE_B, 6);
        let first = *cells.iter().next().unwrap();
        let grid = grid_of([first]);
        let fire = FireRecord::point("b", points::FIRE_B, 90.0, august(1)).with_polygon(geometry);

        let result = FireBinner::new().bin(&grid, &[fire], snapshot());
        let agg = &result.per_cell[&first.to_string()];
        assert!((agg.total_area_hectares - 30.0).abs() < 1e-9);
        assert_eq!(agg.size_class, SizeClass::Medium);
        assert_eq!(result.binned_fires, 1);
        assert_eq!(result.dropped_fires, 0);
        assert!((result.attributed_area() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_unusable_polygon_falls_back_to_centroid() {
        let cell = cell_at(points::FIRE_C, 6);
        let grid = grid_of([cell]);
        let degenerate = FireGeometry::polygon(vec![[-7.9, 38.5], [-7.9, 38.5]]);
        let fire = FireRecord::point("c", points::FIRE_C, 20.0, august(1)).with_polygon(degenerate);

        let result = FireBinner::new().bin(&grid, &[fire], snapshot());
        assert_eq!(result.per_cell[&cell.to_string()].total_area_hectares, 20.0);
        assert_eq!(result.binned_fires, 1);
    }

    #[test]
    fn test_fire_outside_grid_counts_in_totals_only() {
        let grid = grid_of([cell_at(points::FIRE_A, 6)]);
        let fire = FireRecord::point("far", points::OCEAN, 40.0, august(1));

        let result = FireBinner::new().bin(&grid, &[fire], snapshot());
        assert_eq!(result.total_fires, 1);
        assert_eq!(result.total_area_hectares, 40.0);
        assert_eq!(result.dropped_fires, 1);
        assert_eq!(result.active_cells().count(), 0);
        assert_eq!(result.per_cell.len(), 1);
    }

    #[test]
    fn test_negative_area_counts_as_zero() {
        let cell = cell_at(points::FIRE_C, 6);
        let grid = grid_of([cell]);
        let fire = FireRecord::point("neg", points::FIRE_C, -3.0, august(1));

        let result = FireBinner::new().bin(&grid, &[fire], snapshot());
        let agg = &result.per_cell[&cell.to_string()];
        assert_eq!(agg.fire_count, 1);
        assert_eq!(agg.total_area_hectares, 0.0);
        assert_eq!(agg.size_class, SizeClass::Small);
        assert_eq!(result.total_area_hectares, 0.0);
    }

    #[test]
    fn test_empty_records() {
        let grid = grid_of([cell_at(points::FIRE_A, 6)]);
        let result = FireBinner::new().bin(&grid, &[], snapshot());
        assert_eq!(result.total_fires, 0);
        assert!(result.per_cell.values().all(|c| c.size_class == SizeClass::None));
    }
}
