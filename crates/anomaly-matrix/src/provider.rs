//! Time-series provider boundary.
//!
//! The provider owns forecasting (band computation over the lookback) and
//! transport. The engine only depends on the shape of its response.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metric::MetricId;
use crate::segment::{SegmentFilter, SegmentId};
use crate::series::MultiMetricSeries;

/// Time bucket size of the requested series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
}

/// One provider call: every requested metric for one segment filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub segment_filter: SegmentFilter,
    pub metric_ids: BTreeSet<MetricId>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub granularity: Granularity,
}

/// Failure reported by a provider implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Supplies forecast-band series for a composed segment filter.
#[async_trait]
pub trait TimeSeriesProvider: Send + Sync {
    /// Fetch all requested metrics in a single round-trip.
    async fn fetch(&self, request: &FetchRequest) -> Result<MultiMetricSeries, ProviderError>;
}

// ── In-Memory Provider ──────────────────────────────────────────────────

/// Provider backed by pre-loaded series, keyed by segment filter.
///
/// Used for tests, fixtures, and replaying exported data.
#[derive(Default)]
pub struct InMemoryProvider {
    data: HashMap<SegmentFilter, MultiMetricSeries>,
    failing: Mutex<HashSet<SegmentFilter>>,
    calls: AtomicUsize,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the response for an exact filter.
    pub fn insert(&mut self, filter: SegmentFilter, series: MultiMetricSeries) {
        self.data.insert(filter, series);
    }

    /// Register the response for the cell `base AND a AND b`.
    pub fn insert_cell(
        &mut self,
        base: &SegmentFilter,
        a: &SegmentId,
        b: &SegmentId,
        series: MultiMetricSeries,
    ) {
        self.insert(SegmentFilter::for_ids(base, a, b), series);
    }

    /// Make every future fetch for `filter` fail.
    pub fn fail_on(&self, filter: SegmentFilter) {
        self.failing_filters().insert(filter);
    }

    // A panic elsewhere cannot leave the set half-updated, so poison is ignored.
    fn failing_filters(&self) -> MutexGuard<'_, HashSet<SegmentFilter>> {
        self.failing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of fetch calls served so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl TimeSeriesProvider for InMemoryProvider {
    async fn fetch(&self, request: &FetchRequest) -> Result<MultiMetricSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failing = self.failing_filters();
        if failing.contains(&request.segment_filter) {
            return Err(ProviderError::Unavailable(format!(
                "injected failure for {}",
                request.segment_filter
            )));
        }
        drop(failing);

        let stored = self.data.get(&request.segment_filter).ok_or_else(|| {
            ProviderError::Rejected(format!("no data for segment filter {}", request.segment_filter))
        })?;

        let mut response = MultiMetricSeries::new();
        for metric in &request.metric_ids {
            if let Some(records) = stored.get(metric) {
                let in_range = records
                    .iter()
                    .filter(|r| r.date >= request.window_start && r.date <= request.window_end)
                    .cloned()
                    .collect();
                response.insert(metric.clone(), in_range);
            }
        }
        Ok(response)
    }
}
