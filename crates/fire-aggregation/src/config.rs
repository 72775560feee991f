//! Configuration for fire aggregation.

use serde::{Deserialize, Serialize};

/// How records of one fire reported on several days are merged in a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// A fire contributes once, using its most recent report.
    LatestPerFire,
    /// Every daily report contributes.
    KeepAll,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::LatestPerFire
    }
}

impl MergePolicy {
    /// Parse from string (case-insensitive), falling back to `LatestPerFire`.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "keep_all" | "keepall" | "all" => Self::KeepAll,
            _ => Self::LatestPerFire,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LatestPerFire => "latest_per_fire",
            Self::KeepAll => "keep_all",
        }
    }
}

/// Configuration for the aggregation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Maximum memoized range results.
    pub cache_capacity: usize,

    /// Longest accepted date range, inclusive of both ends.
    pub max_range_days: u32,

    /// Merge policy for multi-day ranges.
    pub merge_policy: MergePolicy,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 64,
            max_range_days: 366,
            merge_policy: MergePolicy::LatestPerFire,
        }
    }
}

impl AggregationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("AGGREGATION_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                config.cache_capacity = capacity;
            }
        }

        if let Ok(val) = std::env::var("AGGREGATION_MAX_RANGE_DAYS") {
            if let Ok(days) = val.parse() {
                config.max_range_days = days;
            }
        }

        if let Ok(val) = std::env::var("AGGREGATION_MERGE_POLICY") {
            config.merge_policy = MergePolicy::from_str(&val);
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_capacity == 0 {
            return Err("cache_capacity must be > 0".to_string());
        }

        if self.max_range_days == 0 {
            return Err("max_range_days must be > 0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AggregationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_capacity, 64);
        assert_eq!(config.max_range_days, 366);
        assert_eq!(config.merge_policy, MergePolicy::LatestPerFire);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = AggregationConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_merge_policy_parse() {
        assert_eq!(MergePolicy::from_str("KEEP_ALL"), MergePolicy::KeepAll);
        assert_eq!(MergePolicy::from_str("latest_per_fire"), MergePolicy::LatestPerFire);
        assert_eq!(MergePolicy::from_str("???"), MergePolicy::LatestPerFire);
    }
}
