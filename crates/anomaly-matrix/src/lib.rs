//! # anomaly-matrix
//!
//! Forecast-band anomaly counting across a two-dimensional grid of
//! audience segments.
//!
//! Every day of a metric's series carries an actual value and a forecast
//! band. Days whose actual escapes the band are anomalies; the metric's
//! polarity decides whether the excursion is good or bad. The builder runs
//! this for every `(segment A, segment B, metric)` triple and assembles a
//! complete, ordered matrix of `{good, bad, net}` counts.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────┐   ┌──────────────┐
//!   │ ReportConfig │──▶│  ReportPlan  │
//!   └──────────────┘   └──────┬───────┘
//!                             │ builder()
//!                             ▼
//!                      ┌──────────────┐  one fetch per (a, b)  ┌──────────────────┐
//!                      │MatrixBuilder │───────────────────────▶│TimeSeriesProvider│
//!                      └──────┬───────┘◀───────────────────────└──────────────────┘
//!                             │ per metric    MultiMetricSeries
//!                             ▼
//!                      ┌──────────────┐
//!                      │SeriesAggreg. │──▶ classify(day) per assessed day
//!                      └──────┬───────┘
//!                             │ CellResult
//!                             ▼
//!                      ┌──────────────┐    ┌────────────────┐
//!                      │AnomalyMatrix │───▶│ MatrixSnapshot │ → JSON file
//!                      └──────────────┘    └────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anomaly_matrix::{InMemoryProvider, ReportConfig};
//!
//! # async fn run() -> anomaly_matrix::MatrixResult<()> {
//! let plan = ReportConfig::load(Some("report.toml".as_ref()))?.plan()?;
//! let provider = InMemoryProvider::new();
//! let matrix = plan.run(&provider).await?;
//! for cell in matrix.cells() {
//!     println!("{} {} {}: net {}", cell.segment_a, cell.segment_b, cell.metric, cell.net);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod aggregator;
pub mod builder;
pub mod classifier;
pub mod config;
pub mod error;
pub mod matrix;
pub mod metric;
pub mod persistence;
pub mod provider;
pub mod registry;
pub mod segment;
pub mod series;
pub mod window;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use aggregator::{AnomalyCounts, SeriesAggregator};
pub use builder::{MatrixBuilder, DEFAULT_MAX_CONCURRENT_REQUESTS};
pub use classifier::{classify, classify_record, Classification};
pub use config::{
    LoggingConfig, ProviderConfig, ReportConfig, ReportPlan, SnapshotConfig, WindowConfig,
    ENV_PREFIX,
};
pub use error::{MatrixError, MatrixResult};
pub use matrix::{AnomalyMatrix, CellKey, CellResult, MatrixParts, MetricTotals};
pub use metric::{DisplayFormat, Metric, MetricId, Polarity};
pub use persistence::{
    config_fingerprint, InMemorySnapshot, JsonFileSnapshot, MatrixSnapshot, MatrixSnapshotStore,
};
pub use provider::{
    FetchRequest, Granularity, InMemoryProvider, ProviderError, TimeSeriesProvider,
};
pub use registry::PolarityRegistry;
pub use segment::{Segment, SegmentEntry, SegmentFilter, SegmentId, SegmentList};
pub use series::{DayRecord, MultiMetricSeries};
pub use window::{AssessmentWindow, ReportWindow, DEFAULT_TREND_LOOKBACK_DAYS};
