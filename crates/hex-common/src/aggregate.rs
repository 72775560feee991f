//! Per-cell aggregation results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Severity bucket derived from a cell's burnt area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    None,
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// Upper bound (exclusive) of the Small bucket, in hectares.
    pub const SMALL_LIMIT_HA: f64 = 10.0;
    /// Upper bound (exclusive) of the Medium bucket, in hectares.
    pub const MEDIUM_LIMIT_HA: f64 = 100.0;

    /// Bucket for an area, assuming at least one fire contributed.
    pub fn from_area(area_hectares: f64) -> Self {
        if area_hectares < Self::SMALL_LIMIT_HA {
            SizeClass::Small
        } else if area_hectares < Self::MEDIUM_LIMIT_HA {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }

    /// Bucket for a cell; cells without fires are `None` whatever their area.
    pub fn classify(fire_count: u32, area_hectares: f64) -> Self {
        if fire_count == 0 {
            SizeClass::None
        } else {
            Self::from_area(area_hectares)
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::None => "none",
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }
}

/// Aggregated fire activity of one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellAggregate {
    pub cell_id: String,
    pub total_area_hectares: f64,
    pub fire_count: u32,
    pub size_class: SizeClass,
    pub contributing_fire_ids: BTreeSet<String>,
}

impl CellAggregate {
    pub fn empty(cell_id: impl Into<String>) -> Self {
        Self {
            cell_id: cell_id.into(),
            total_area_hectares: 0.0,
            fire_count: 0,
            size_class: SizeClass::None,
            contributing_fire_ids: BTreeSet::new(),
        }
    }

    /// Attribute (part of) a fire's area to this cell.
    pub fn attribute(&mut self, fire_id: &str, area_hectares: f64) {
        self.total_area_hectares += area_hectares;
        self.fire_count += 1;
        self.contributing_fire_ids.insert(fire_id.to_string());
    }

    /// Recompute `size_class` from the current totals.
    pub fn classify(&mut self) {
        self.size_class = SizeClass::classify(self.fire_count, self.total_area_hectares);
    }
}

/// What an aggregation covers in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AggregationScope {
    /// A single set of records, optionally tied to one date.
    Snapshot { date: Option<NaiveDate> },
    /// Records merged across an inclusive date range.
    Range { start: NaiveDate, end: NaiveDate },
}

/// Fire activity binned onto a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub resolution: u8,
    pub scope: AggregationScope,
    pub per_cell: BTreeMap<String, CellAggregate>,
    /// Number of input records, independent of binning success.
    pub total_fires: usize,
    /// Sum of input record areas, independent of binning success.
    pub total_area_hectares: f64,
    /// Records that were attributed to at least one cell.
    #[serde(default)]
    pub binned_fires: usize,
    /// Records that fell outside the grid.
    #[serde(default)]
    pub dropped_fires: usize,
    /// Days the record store failed to deliver (range scope only).
    #[serde(default)]
    pub failed_days: Vec<NaiveDate>,
}

impl AggregationResult {
    /// A zero-valued result with no cells.
    pub fn empty(resolution: u8, scope: AggregationScope) -> Self {
        Self {
            resolution,
            scope,
            per_cell: BTreeMap::new(),
            total_fires: 0,
            total_area_hectares: 0.0,
            binned_fires: 0,
            dropped_fires: 0,
            failed_days: Vec::new(),
        }
    }

    /// Sum of area attributed to cells (may be below the input total).
    pub fn attributed_area(&self) -> f64 {
        self.per_cell.values().map(|c| c.total_area_hectares).sum()
    }

    /// Cells with at least one contributing fire.
    pub fn active_cells(&self) -> impl Iterator<Item = &CellAggregate> {
        self.per_cell.values().filter(|c| c.fire_count > 0)
    }

    pub fn is_complete(&self) -> bool {
        self.failed_days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_class_boundaries() {
        assert_eq!(SizeClass::classify(1, 9.999), SizeClass::Small);
        assert_eq!(SizeClass::classify(1, 10.0), SizeClass::Medium);
        assert_eq!(SizeClass::classify(1, 99.999), SizeClass::Medium);
        assert_eq!(SizeClass::classify(1, 100.0), SizeClass::Large);
        assert_eq!(SizeClass::classify(0, 500.0), SizeClass::None);
    }

    #[test]
    fn test_cell_aggregate_attribution() {
        let mut cell = CellAggregate::empty("861f1d48fffffff");
        cell.attribute("a", 4.0);
        cell.attribute("b", 8.0);
        cell.classify();
        assert_eq!(cell.fire_count, 2);
        assert_eq!(cell.total_area_hectares, 12.0);
        assert_eq!(cell.size_class, SizeClass::Medium);
        assert_eq!(cell.contributing_fire_ids.len(), 2);
    }
}
