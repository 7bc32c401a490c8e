//! Property tests: a day's classification depends only on where the actual
//! sits relative to the band, the polarity, and the weekend policy.

use anomaly_matrix::*;
use chrono::{Datelike, NaiveDate, Weekday};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helpers / Strategies
// ---------------------------------------------------------------------------

fn arb_polarity() -> impl Strategy<Value = Polarity> {
    prop_oneof![Just(Polarity::HigherIsGood), Just(Polarity::HigherIsBad)]
}

/// Any day in 2024.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1u32..=366).prop_map(|ordinal| NaiveDate::from_yo_opt(2024, ordinal).unwrap())
}

/// A band `(lower, upper)` with `lower <= upper`.
fn arb_band() -> impl Strategy<Value = (f64, f64)> {
    (-1.0e6f64..1.0e6, 0.0f64..1.0e5).prop_map(|(lower, width)| (lower, lower + width))
}

fn record(date: NaiveDate, actual: f64, lower: f64, upper: f64) -> DayRecord {
    DayRecord::new(date, actual, (lower + upper) / 2.0, upper, lower)
}

fn flip(polarity: Polarity) -> Polarity {
    match polarity {
        Polarity::HigherIsGood => Polarity::HigherIsBad,
        Polarity::HigherIsBad => Polarity::HigherIsGood,
    }
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    /// An actual inside the band, bounds included, is never an anomaly.
    #[test]
    fn inside_band_is_never_anomalous(
        date in arb_date(),
        (lower, upper) in arb_band(),
        t in 0.0f64..=1.0,
        polarity in arb_polarity(),
    ) {
        let actual = (lower + (upper - lower) * t).clamp(lower, upper);
        let c = classify(&record(date, actual, lower, upper), polarity, false, true);
        prop_assert_eq!(c, Classification::NoAnomaly);

        for edge in [lower, upper] {
            let c = classify(&record(date, edge, lower, upper), polarity, false, true);
            prop_assert_eq!(c, Classification::NoAnomaly);
        }
    }

    /// Above the band is good exactly when higher is good; below is the mirror.
    #[test]
    fn excursion_direction_and_polarity_decide_sign(
        date in arb_date(),
        (lower, upper) in arb_band(),
        excess in 1.0f64..1.0e5,
        polarity in arb_polarity(),
    ) {
        let above = classify(&record(date, upper + excess, lower, upper), polarity, false, false);
        let below = classify(&record(date, lower - excess, lower, upper), polarity, false, false);

        if polarity.higher_is_good() {
            prop_assert_eq!(above, Classification::GoodAnomaly);
            prop_assert_eq!(below, Classification::BadAnomaly);
        } else {
            prop_assert_eq!(above, Classification::BadAnomaly);
            prop_assert_eq!(below, Classification::GoodAnomaly);
        }
    }

    /// Flipping polarity swaps good and bad and leaves everything else alone.
    #[test]
    fn polarity_flip_swaps_good_and_bad(
        date in arb_date(),
        (lower, upper) in arb_band(),
        actual in -2.0e6f64..2.0e6,
        polarity in arb_polarity(),
        include_weekends in any::<bool>(),
    ) {
        let rec = record(date, actual, lower, upper);
        let original = classify_record(&rec, polarity, include_weekends);
        let flipped = classify_record(&rec, flip(polarity), include_weekends);

        let expected = match original {
            Classification::GoodAnomaly => Classification::BadAnomaly,
            Classification::BadAnomaly => Classification::GoodAnomaly,
            other => other,
        };
        prop_assert_eq!(flipped, expected);
    }

    /// Weekend days are excluded under a weekday-only policy, whatever their values.
    #[test]
    fn weekends_excluded_when_not_included(
        date in arb_date(),
        (lower, upper) in arb_band(),
        actual in -2.0e6f64..2.0e6,
        polarity in arb_polarity(),
    ) {
        let rec = record(date, actual, lower, upper);
        let c = classify_record(&rec, polarity, false);
        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);

        prop_assert_eq!(c == Classification::ExcludedWeekend, weekend);
        prop_assert_eq!(
            classify_record(&rec, polarity, true) == Classification::ExcludedWeekend,
            false
        );
    }

    /// A missing or non-finite actual never produces an anomaly.
    #[test]
    fn missing_actual_is_never_anomalous(
        date in arb_date(),
        (lower, upper) in arb_band(),
        actual in prop_oneof![Just(None), Just(Some(f64::NAN)), Just(Some(f64::INFINITY))],
        polarity in arb_polarity(),
        include_weekends in any::<bool>(),
    ) {
        let mut rec = record(date, 0.0, lower, upper);
        rec.actual = actual;
        prop_assert!(!classify_record(&rec, polarity, include_weekends).is_anomaly());
    }
}
