//! Assessment and trend windows.
//!
//! The provider is asked for the trend window (lookback plus assessment)
//! so the renderer can plot context, but only days inside the assessment
//! window are ever counted.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::error::{MatrixError, MatrixResult};

/// Default number of trend-only days fetched before the assessment window.
pub const DEFAULT_TREND_LOOKBACK_DAYS: u32 = 35;

/// The inclusive date range whose days are classified and counted.
///
/// Only built through [`AssessmentWindow::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct AssessmentWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl AssessmentWindow {
    /// Both ends are inclusive. `start >= end` is a configuration error.
    pub fn new(start: NaiveDate, end: NaiveDate) -> MatrixResult<Self> {
        if start >= end {
            return Err(MatrixError::config(
                "window",
                format!("assessment start {} must precede end {}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days in the window, both ends included.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Assessment window plus trend lookback: what the provider is asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ReportWindow {
    assessment: AssessmentWindow,
    trend_lookback_days: u32,
    fetch_start: NaiveDate,
}

impl ReportWindow {
    /// Fails when the lookback reaches past the earliest representable date.
    pub fn new(assessment: AssessmentWindow, trend_lookback_days: u32) -> MatrixResult<Self> {
        let fetch_start = assessment
            .start
            .checked_sub_days(Days::new(u64::from(trend_lookback_days)))
            .ok_or_else(|| {
                MatrixError::config(
                    "window.trend_lookback_days",
                    format!(
                        "{} days before {} is out of range",
                        trend_lookback_days, assessment.start
                    ),
                )
            })?;
        Ok(Self {
            assessment,
            trend_lookback_days,
            fetch_start,
        })
    }

    pub fn assessment(&self) -> AssessmentWindow {
        self.assessment
    }

    pub fn trend_lookback_days(&self) -> u32 {
        self.trend_lookback_days
    }

    /// First day requested from the provider.
    pub fn fetch_start(&self) -> NaiveDate {
        self.fetch_start
    }

    /// Last day requested from the provider.
    pub fn fetch_end(&self) -> NaiveDate {
        self.assessment.end
    }
}
