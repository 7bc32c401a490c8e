//! Metric definitions.
//!
//! A `Metric` is loaded once from configuration and never mutated. Its
//! polarity decides which direction of surprise is good news; its display
//! format and decimal precision pass through untouched to the renderer.

use serde::{Deserialize, Serialize};

// ── Metric Identification ───────────────────────────────────────────────

/// Identifies a metric, e.g. `"revenue"` or `"bounce_rate"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(pub String);

impl MetricId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MetricId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MetricId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ── Polarity ────────────────────────────────────────────────────────────

/// Whether an increase in a metric is good or bad news.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Revenue, orders, visits: up is good.
    HigherIsGood,
    /// Bounce rate, cart abandonment: up is bad.
    HigherIsBad,
}

impl Polarity {
    pub fn higher_is_good(self) -> bool {
        matches!(self, Polarity::HigherIsGood)
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Polarity::HigherIsGood => write!(f, "higher_is_good"),
            Polarity::HigherIsBad => write!(f, "higher_is_bad"),
        }
    }
}

// ── Display Settings ────────────────────────────────────────────────────

/// How the renderer should format values of a metric.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    #[default]
    Decimal,
    Percent,
    Currency,
    Time,
}

// ── Metric ──────────────────────────────────────────────────────────────

/// A metric tracked in the report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: MetricId,
    /// Human-readable name.
    pub name: String,
    pub polarity: Polarity,
    #[serde(default)]
    pub format: DisplayFormat,
    /// Decimal places shown by the renderer.
    #[serde(default)]
    pub decimals: u8,
}

impl Metric {
    pub fn new(id: impl Into<String>, name: impl Into<String>, polarity: Polarity) -> Self {
        Self {
            id: MetricId::new(id),
            name: name.into(),
            polarity,
            format: DisplayFormat::default(),
            decimals: 0,
        }
    }

    /// Set display format and precision.
    pub fn with_display(mut self, format: DisplayFormat, decimals: u8) -> Self {
        self.format = format;
        self.decimals = decimals;
        self
    }
}
