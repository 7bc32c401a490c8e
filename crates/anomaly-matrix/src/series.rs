//! Per-day forecast records as returned by the time-series provider.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::metric::MetricId;

/// One metric's values for one day.
///
/// Any numeric field may be absent when the provider lacked data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub actual: Option<f64>,
    #[serde(default)]
    pub forecast: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
    #[serde(default)]
    pub lower: Option<f64>,
}

impl DayRecord {
    /// A fully populated record.
    pub fn new(date: NaiveDate, actual: f64, forecast: f64, upper: f64, lower: f64) -> Self {
        Self {
            date,
            actual: Some(actual),
            forecast: Some(forecast),
            upper: Some(upper),
            lower: Some(lower),
        }
    }

    /// A record with no values at all.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            actual: None,
            forecast: None,
            upper: None,
            lower: None,
        }
    }

    /// Saturday or Sunday.
    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// The actual value and band, if all three are present and finite.
    pub fn band(&self) -> Option<(f64, f64, f64)> {
        let actual = self.actual.filter(|v| v.is_finite())?;
        let lower = self.lower.filter(|v| v.is_finite())?;
        let upper = self.upper.filter(|v| v.is_finite())?;
        Some((actual, lower, upper))
    }

    /// Whether any of actual, forecast or bounds is missing or non-finite.
    ///
    /// Broader than `band()`: a missing forecast is a gap but does not
    /// prevent classification.
    pub fn has_data_gap(&self) -> bool {
        self.band().is_none() || !self.forecast.is_some_and(f64::is_finite)
    }
}

/// A provider response: per-metric, per-day series for one segment pair.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiMetricSeries {
    series: HashMap<MetricId, Vec<DayRecord>>,
}

impl MultiMetricSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a metric's series.
    pub fn insert(&mut self, metric: MetricId, records: Vec<DayRecord>) {
        self.series.insert(metric, records);
    }

    /// Builder-style insert.
    pub fn with(mut self, metric: impl Into<MetricId>, records: Vec<DayRecord>) -> Self {
        self.insert(metric.into(), records);
        self
    }

    pub fn get(&self, metric: &MetricId) -> Option<&[DayRecord]> {
        self.series.get(metric).map(Vec::as_slice)
    }

    pub fn metric_ids(&self) -> impl Iterator<Item = &MetricId> {
        self.series.keys()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
