//! Read-only access to daily fire records.
//!
//! The record store is owned by the ingestion side; this crate only reads
//! it. A day that cannot be read is reported back to the caller instead of
//! aborting a whole date range.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use hex_common::{DateRange, FireRecord, GridError, GridResult};

use crate::object_store::{ObjectStorage, StoragePath};

/// Records gathered for a date range.
#[derive(Debug, Clone, Default)]
pub struct RangeRecords {
    /// Records in day order, then store order within a day.
    pub records: Vec<FireRecord>,
    /// Days that failed to load and were skipped.
    pub failed_days: Vec<NaiveDate>,
    /// Days read successfully.
    pub days_read: u32,
}

/// Day-by-day reader over the fire record store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Records reported for one day; an empty day is `Ok(vec![])`.
    async fn records_for_date(&self, date: NaiveDate) -> GridResult<Vec<FireRecord>>;

    /// Records for every day of `range`, skipping days that fail.
    async fn records_for_range(&self, range: &DateRange) -> RangeRecords {
        let mut gathered = RangeRecords::default();

        for day in range.days() {
            match self.records_for_date(day).await {
                Ok(records) => {
                    debug!(date = %day, count = records.len(), "Loaded fire records");
                    gathered.records.extend(records);
                    gathered.days_read += 1;
                }
                Err(e) => {
                    warn!(date = %day, error = %e, "Skipping day, record store read failed");
                    gathered.failed_days.push(day);
                }
            }
        }

        gathered
    }
}

/// Record store held in memory, keyed by day.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    days: BTreeMap<NaiveDate, Vec<FireRecord>>,
    failing_days: Vec<NaiveDate>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group records by their own `date`.
    pub fn from_records(records: impl IntoIterator<Item = FireRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    pub fn insert(&mut self, record: FireRecord) {
        self.days.entry(record.date).or_default().push(record);
    }

    /// Make reads for `date` fail, to exercise partial ranges.
    pub fn fail_on(mut self, date: NaiveDate) -> Self {
        self.failing_days.push(date);
        self
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn records_for_date(&self, date: NaiveDate) -> GridResult<Vec<FireRecord>> {
        if self.failing_days.contains(&date) {
            return Err(GridError::RecordStore(format!("day {} unavailable", date)));
        }
        Ok(self.days.get(&date).cloned().unwrap_or_default())
    }
}

/// Record store reading one JSON array per day from object storage.
///
/// Layout: `records/{YYYY-MM-DD}.json`; a missing file means no fires.
pub struct ObjectStoreRecordStore {
    storage: Arc<ObjectStorage>,
}

impl ObjectStoreRecordStore {
    pub fn new(storage: Arc<ObjectStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl RecordStore for ObjectStoreRecordStore {
    async fn records_for_date(&self, date: NaiveDate) -> GridResult<Vec<FireRecord>> {
        let path = StoragePath::daily_records(date);

        let bytes = self
            .storage
            .get(&path)
            .await
            .map_err(|e| GridError::RecordStore(e.to_string()))?;

        match bytes {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                GridError::RecordStore(format!("Failed to decode {}: {}", path, e))
            }),
            None => Ok(Vec::new()),
        }
    }
}
