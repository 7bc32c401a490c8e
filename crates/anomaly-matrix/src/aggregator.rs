//! Series aggregation: fold per-day classifications into counts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::classifier::{classify_record, Classification};
use crate::metric::{MetricId, Polarity};
use crate::series::DayRecord;
use crate::window::AssessmentWindow;

/// Counts for one (segment pair, metric) series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyCounts {
    pub good: u32,
    pub bad: u32,
    /// Weekend days skipped under a weekday-only policy.
    pub excluded: u32,
    /// Days inside the window lacking actual, forecast or bounds.
    pub data_gaps: u32,
    /// Days inside the window, whatever their classification.
    pub assessed_days: u32,
}

impl AnomalyCounts {
    /// `good - bad`; negative when bad news dominates.
    pub fn net(&self) -> i64 {
        i64::from(self.good) - i64::from(self.bad)
    }

    fn record(&mut self, classification: Classification) {
        match classification {
            Classification::GoodAnomaly => self.good += 1,
            Classification::BadAnomaly => self.bad += 1,
            Classification::ExcludedWeekend => self.excluded += 1,
            Classification::NoAnomaly => {}
        }
    }
}

/// Classifies and counts the assessment-window days of a series.
///
/// Days outside the window are trend context only and are skipped, no
/// matter how many the provider returned. A date reported more than once
/// counts once, using the last record for it.
#[derive(Clone, Copy, Debug)]
pub struct SeriesAggregator {
    window: AssessmentWindow,
    include_weekends: bool,
}

impl SeriesAggregator {
    pub fn new(window: AssessmentWindow, include_weekends: bool) -> Self {
        Self {
            window,
            include_weekends,
        }
    }

    pub fn window(&self) -> &AssessmentWindow {
        &self.window
    }

    /// Aggregate one metric's series.
    pub fn aggregate(
        &self,
        metric: &MetricId,
        polarity: Polarity,
        records: &[DayRecord],
    ) -> AnomalyCounts {
        let mut by_date: BTreeMap<NaiveDate, &DayRecord> = BTreeMap::new();
        for record in records.iter().filter(|r| self.window.contains(r.date)) {
            if by_date.insert(record.date, record).is_some() {
                tracing::warn!(
                    metric = %metric,
                    date = %record.date,
                    "duplicate date in series, keeping the last record"
                );
            }
        }

        let mut counts = AnomalyCounts::default();
        for record in by_date.into_values() {
            counts.assessed_days += 1;
            let classification = classify_record(record, polarity, self.include_weekends);

            if classification != Classification::ExcludedWeekend && record.has_data_gap() {
                counts.data_gaps += 1;
                tracing::warn!(
                    metric = %metric,
                    date = %record.date,
                    "data gap: missing actual, forecast or bounds"
                );
            }

            counts.record(classification);
        }

        counts
    }
}
