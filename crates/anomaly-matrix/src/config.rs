//! Report configuration.
//!
//! Layered like the daemon configs elsewhere in the workspace: built-in
//! defaults, then an optional file (TOML, YAML or JSON by extension), then
//! `ANOMALY_MATRIX__*` environment variables.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::builder::{MatrixBuilder, DEFAULT_MAX_CONCURRENT_REQUESTS};
use crate::error::{MatrixError, MatrixResult};
use crate::matrix::AnomalyMatrix;
use crate::metric::Metric;
use crate::persistence::config_fingerprint;
use crate::provider::TimeSeriesProvider;
use crate::registry::PolarityRegistry;
use crate::segment::{SegmentEntry, SegmentFilter, SegmentId, SegmentList};
use crate::window::{AssessmentWindow, ReportWindow, DEFAULT_TREND_LOOKBACK_DAYS};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "ANOMALY_MATRIX";

/// Main report configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Metrics assessed in every cell, in display order.
    #[serde(default)]
    pub metrics: Vec<Metric>,

    /// Row segments, in display order.
    #[serde(default)]
    pub segments_a: Vec<SegmentEntry>,

    /// Column segments, in display order.
    #[serde(default)]
    pub segments_b: Vec<SegmentEntry>,

    /// Segments ANDed into every cell's filter.
    #[serde(default)]
    pub base_segments: Vec<SegmentId>,

    #[serde(default)]
    pub window: WindowConfig,

    /// Count Saturday/Sunday anomalies.
    #[serde(default)]
    pub include_weekends: bool,

    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub snapshot: SnapshotConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Assessment window configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// First assessed day (inclusive).
    #[serde(default)]
    pub assessment_start: Option<NaiveDate>,

    /// Last assessed day (inclusive).
    #[serde(default)]
    pub assessment_end: Option<NaiveDate>,

    /// Trend-only days fetched before the assessment window
    #[serde(default = "default_trend_lookback")]
    pub trend_lookback_days: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            assessment_start: None,
            assessment_end: None,
            trend_lookback_days: DEFAULT_TREND_LOOKBACK_DAYS,
        }
    }
}

/// Provider call policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Maximum provider calls in flight
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    /// Per-call timeout in seconds; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            timeout_secs: None,
        }
    }
}

/// Snapshot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Where the built matrix is written
    #[serde(default = "default_snapshot_path")]
    pub path: String,

    /// Reuse a stored matrix whose fingerprint matches this configuration
    #[serde(default)]
    pub reuse: bool,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
            reuse: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_trend_lookback() -> u32 {
    DEFAULT_TREND_LOOKBACK_DAYS
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}

fn default_snapshot_path() -> String {
    "anomaly-matrix.snapshot.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ReportConfig {
    /// Load configuration: defaults, then `path` (if any), then environment.
    pub fn load(path: Option<&Path>) -> MatrixResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ReportConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Validate every key and produce an executable plan.
    pub fn plan(&self) -> MatrixResult<ReportPlan> {
        if self.metrics.is_empty() {
            return Err(MatrixError::config("metrics", "metric list is empty"));
        }

        let segments_a = SegmentList::from_entries("segments_a", &self.segments_a)?;
        let segments_b = SegmentList::from_entries("segments_b", &self.segments_b)?;

        let start = self
            .window
            .assessment_start
            .ok_or_else(|| MatrixError::config("window.assessment_start", "not set"))?;
        let end = self
            .window
            .assessment_end
            .ok_or_else(|| MatrixError::config("window.assessment_end", "not set"))?;
        let assessment = AssessmentWindow::new(start, end)?;

        if self.provider.max_concurrent_requests == 0 {
            return Err(MatrixError::config(
                "provider.max_concurrent_requests",
                "must be at least 1",
            ));
        }
        if self.provider.timeout_secs == Some(0) {
            return Err(MatrixError::config("provider.timeout_secs", "must be positive"));
        }

        let base = self
            .base_segments
            .iter()
            .fold(SegmentFilter::everything(), |acc, id| {
                acc.and(SegmentFilter::Segment(id.clone()))
            });

        Ok(ReportPlan {
            registry: PolarityRegistry::from_metrics(&self.metrics),
            metrics: self.metrics.clone(),
            segments_a,
            segments_b,
            base,
            window: ReportWindow::new(assessment, self.window.trend_lookback_days)?,
            include_weekends: self.include_weekends,
            max_concurrent_requests: self.provider.max_concurrent_requests,
            provider_timeout: self.provider.timeout_secs.map(Duration::from_secs),
        })
    }
}

/// A validated configuration, ready to run.
#[derive(Debug, Clone)]
pub struct ReportPlan {
    pub registry: PolarityRegistry,
    pub metrics: Vec<Metric>,
    pub segments_a: SegmentList,
    pub segments_b: SegmentList,
    pub base: SegmentFilter,
    pub window: ReportWindow,
    pub include_weekends: bool,
    pub max_concurrent_requests: usize,
    pub provider_timeout: Option<Duration>,
}

impl ReportPlan {
    pub fn builder(&self) -> MatrixBuilder {
        let builder = MatrixBuilder::new(self.registry.clone(), self.window, self.include_weekends)
            .with_max_concurrent_requests(self.max_concurrent_requests);
        match self.provider_timeout {
            Some(timeout) => builder.with_provider_timeout(timeout),
            None => builder,
        }
    }

    /// Fingerprint of the inputs that determine the matrix.
    pub fn fingerprint(&self) -> MatrixResult<String> {
        config_fingerprint(
            &self.metrics,
            &self.segments_a,
            &self.segments_b,
            &self.base,
            &self.window,
            self.include_weekends,
        )
    }

    /// Build the matrix against `provider`.
    pub async fn run<P>(&self, provider: &P) -> MatrixResult<AnomalyMatrix>
    where
        P: TimeSeriesProvider + ?Sized,
    {
        self.builder()
            .build(
                &self.segments_a,
                &self.segments_b,
                &self.metrics,
                &self.base,
                provider,
            )
            .await
    }
}
