//! Day classification against a forecast band.
//!
//! ```text
//!   weekend && !include_weekends ──► ExcludedWeekend
//!   missing actual / bounds      ──► NoAnomaly
//!   actual > upper               ──► Good (higher_is_good) | Bad
//!   actual < lower               ──► Bad  (higher_is_good) | Good
//!   lower <= actual <= upper     ──► NoAnomaly
//! ```

use serde::{Deserialize, Serialize};

use crate::metric::Polarity;
use crate::series::DayRecord;

/// Outcome of classifying one day of one metric.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    NoAnomaly,
    GoodAnomaly,
    BadAnomaly,
    /// Weekend day under a weekday-only policy. Still plotted, never counted.
    ExcludedWeekend,
}

impl Classification {
    pub fn is_anomaly(self) -> bool {
        matches!(self, Classification::GoodAnomaly | Classification::BadAnomaly)
    }
}

/// Classify one day.
pub fn classify(
    record: &DayRecord,
    polarity: Polarity,
    is_weekend: bool,
    include_weekends: bool,
) -> Classification {
    if is_weekend && !include_weekends {
        return Classification::ExcludedWeekend;
    }

    let Some((actual, lower, upper)) = record.band() else {
        return Classification::NoAnomaly;
    };

    if actual > upper {
        if polarity.higher_is_good() {
            Classification::GoodAnomaly
        } else {
            Classification::BadAnomaly
        }
    } else if actual < lower {
        if polarity.higher_is_good() {
            Classification::BadAnomaly
        } else {
            Classification::GoodAnomaly
        }
    } else {
        Classification::NoAnomaly
    }
}

/// Classify one day, deriving the weekend flag from the record's date.
pub fn classify_record(
    record: &DayRecord,
    polarity: Polarity,
    include_weekends: bool,
) -> Classification {
    classify(record, polarity, record.is_weekend(), include_weekends)
}
