//! Shared fixtures for the end-to-end tests.

#![allow(dead_code)]

use anomaly_matrix::*;
use chrono::NaiveDate;

/// A day in June 2024. The 3rd is a Monday.
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

/// Mon 2024-06-03 .. Fri 2024-06-07, default lookback.
pub fn work_week() -> ReportWindow {
    ReportWindow::new(
        AssessmentWindow::new(day(3), day(7)).unwrap(),
        DEFAULT_TREND_LOOKBACK_DAYS,
    )
    .unwrap()
}

pub fn segments(key: &str, ids: &[&str]) -> SegmentList {
    let entries: Vec<SegmentEntry> = ids
        .iter()
        .map(|id| SegmentEntry::new(*id, id.to_uppercase()))
        .collect();
    SegmentList::from_entries(key, &entries).unwrap()
}

pub fn revenue() -> Metric {
    Metric::new("revenue", "Revenue", Polarity::HigherIsGood).with_display(DisplayFormat::Currency, 2)
}

/// Revenue over the work week: one spike above, one dip below, three in band.
pub fn revenue_week() -> Vec<DayRecord> {
    vec![
        DayRecord::new(day(3), 120.0, 110.0, 130.0, 90.0),
        DayRecord::new(day(4), 200.0, 100.0, 150.0, 50.0),
        DayRecord::new(day(5), 10.0, 100.0, 150.0, 50.0),
        DayRecord::new(day(6), 100.0, 100.0, 150.0, 50.0),
        DayRecord::new(day(7), 150.0, 100.0, 150.0, 50.0),
    ]
}

/// A flat, always-in-band series for the given days.
pub fn quiet(days: std::ops::RangeInclusive<u32>) -> Vec<DayRecord> {
    days.map(|d| DayRecord::new(day(d), 100.0, 100.0, 110.0, 90.0))
        .collect()
}

/// Provider with `series` registered for every `(a, b)` pair.
pub fn provider_for(
    a: &SegmentList,
    b: &SegmentList,
    base: &SegmentFilter,
    series: &MultiMetricSeries,
) -> InMemoryProvider {
    let mut provider = InMemoryProvider::new();
    for sa in a {
        for sb in b {
            provider.insert_cell(base, &sa.id, &sb.id, series.clone());
        }
    }
    provider
}
