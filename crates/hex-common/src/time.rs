//! Date handling for snapshot and cumulative queries.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> GridResult<Self> {
        if start > end {
            return Err(GridError::InvalidDateRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse "YYYY-MM-DD/YYYY-MM-DD" or a single "YYYY-MM-DD".
    pub fn parse(s: &str) -> GridResult<Self> {
        let parse_date = |d: &str| {
            NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").map_err(|e| {
                GridError::InvalidDateRange(format!("invalid date '{}': {}", d.trim(), e))
            })
        };

        match s.split_once('/') {
            Some((start, end)) => Self::new(parse_date(start)?, parse_date(end)?),
            None => {
                let day = parse_date(s)?;
                Self::new(day, day)
            }
        }
    }

    /// Number of days in the range, both ends included.
    pub fn len_days(&self) -> u32 {
        ((self.end - self.start).num_days() + 1) as u32
    }

    /// Iterate every day from start to end.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len_days()).map(move |offset| start + Duration::days(offset as i64))
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        date >= &self.start && date <= &self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_range_days_inclusive() {
        let range = DateRange::new(d(2024, 2, 27), d(2024, 3, 1)).unwrap();
        let days: Vec<_> = range.days().collect();
        assert_eq!(days, vec![d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]);
        assert_eq!(range.len_days(), 4);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = DateRange::new(d(2024, 3, 2), d(2024, 3, 1)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_parse() {
        let range = DateRange::parse("2024-08-01/2024-08-15").unwrap();
        assert_eq!(range.len_days(), 15);
        assert_eq!(range.to_string(), "2024-08-01/2024-08-15");

        let single = DateRange::parse("2024-08-01").unwrap();
        assert_eq!(single.start, single.end);

        assert!(DateRange::parse("2024-13-01").is_err());
    }
}
