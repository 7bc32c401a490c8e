//! Property tests: window aggregation counts.

use anomaly_matrix::*;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

/// Window `[start, start + len]`.
fn window(len: i64) -> AssessmentWindow {
    AssessmentWindow::new(start(), start() + Duration::days(len)).unwrap()
}

/// One day at `offset` from the window start, possibly with missing values.
fn arb_day() -> impl Strategy<Value = DayRecord> {
    (
        -40i64..40,
        prop::option::weighted(0.9, -500.0f64..500.0),
        -100.0f64..100.0,
        0.0f64..200.0,
    )
        .prop_map(|(offset, actual, lower, width)| DayRecord {
            date: start() + Duration::days(offset),
            actual,
            forecast: Some(lower + width / 2.0),
            upper: Some(lower + width),
            lower: Some(lower),
        })
}

fn arb_series() -> impl Strategy<Value = Vec<DayRecord>> {
    prop::collection::vec(arb_day(), 0..60)
}

fn arb_polarity() -> impl Strategy<Value = Polarity> {
    prop_oneof![Just(Polarity::HigherIsGood), Just(Polarity::HigherIsBad)]
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// Net is always good minus bad, and counts never exceed the assessed days.
    #[test]
    fn net_is_good_minus_bad(
        records in arb_series(),
        len in 1i64..30,
        polarity in arb_polarity(),
        include_weekends in any::<bool>(),
    ) {
        let agg = SeriesAggregator::new(window(len), include_weekends);
        let counts = agg.aggregate(&MetricId::new("m"), polarity, &records);

        prop_assert_eq!(counts.net(), i64::from(counts.good) - i64::from(counts.bad));
        prop_assert!(counts.good + counts.bad + counts.excluded <= counts.assessed_days);
    }

    /// Aggregating the same series twice gives the same counts.
    #[test]
    fn aggregation_is_idempotent(
        records in arb_series(),
        len in 1i64..30,
        polarity in arb_polarity(),
    ) {
        let agg = SeriesAggregator::new(window(len), false);
        let metric = MetricId::new("m");
        prop_assert_eq!(
            agg.aggregate(&metric, polarity, &records),
            agg.aggregate(&metric, polarity, &records)
        );
    }

    /// Days outside the window contribute nothing.
    #[test]
    fn only_window_days_count(
        records in arb_series(),
        len in 1i64..30,
        polarity in arb_polarity(),
        include_weekends in any::<bool>(),
    ) {
        let w = window(len);
        let agg = SeriesAggregator::new(w, include_weekends);
        let metric = MetricId::new("m");

        let inside: Vec<DayRecord> = records.iter().filter(|r| w.contains(r.date)).cloned().collect();
        prop_assert_eq!(
            agg.aggregate(&metric, polarity, &records),
            agg.aggregate(&metric, polarity, &inside)
        );
    }

    /// Each window date is assessed once, however often the provider repeats it.
    #[test]
    fn assessed_days_are_distinct_window_dates(
        records in arb_series(),
        len in 1i64..30,
        polarity in arb_polarity(),
    ) {
        let w = window(len);
        let distinct: std::collections::BTreeSet<NaiveDate> =
            records.iter().map(|r| r.date).filter(|d| w.contains(*d)).collect();
        let counts = SeriesAggregator::new(w, true)
            .aggregate(&MetricId::new("m"), polarity, &records);

        prop_assert_eq!(counts.assessed_days as usize, distinct.len());
    }

    /// Blanking every actual leaves no anomalies.
    #[test]
    fn null_actuals_never_counted(
        records in arb_series(),
        len in 1i64..30,
        polarity in arb_polarity(),
        include_weekends in any::<bool>(),
    ) {
        let blanked: Vec<DayRecord> = records
            .into_iter()
            .map(|mut r| {
                r.actual = None;
                r
            })
            .collect();
        let counts = SeriesAggregator::new(window(len), include_weekends)
            .aggregate(&MetricId::new("m"), polarity, &blanked);

        prop_assert_eq!(counts.good, 0);
        prop_assert_eq!(counts.bad, 0);
    }

    /// Flipping polarity swaps good and bad totals.
    #[test]
    fn polarity_flip_negates_net(
        records in arb_series(),
        len in 1i64..30,
        include_weekends in any::<bool>(),
    ) {
        let agg = SeriesAggregator::new(window(len), include_weekends);
        let metric = MetricId::new("m");
        let good = agg.aggregate(&metric, Polarity::HigherIsGood, &records);
        let bad = agg.aggregate(&metric, Polarity::HigherIsBad, &records);

        prop_assert_eq!(good.good, bad.bad);
        prop_assert_eq!(good.bad, bad.good);
        prop_assert_eq!(good.net(), -bad.net());
    }
}
