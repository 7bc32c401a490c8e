//! Matrix builder: drives the segment outer product.
//!
//! ```text
//!   for (a, b) in A × B                      ── one provider call per pair
//!       fetch(base AND a AND b, all metrics)
//!       for metric in metrics                ── one aggregation per metric
//!           SeriesAggregator ──► CellResult
//!   collect ──► AnomalyMatrix::from_cells
//! ```
//!
//! Pairs may be fetched concurrently. Each pair produces its own cells and
//! the merge happens once every call has returned, so there is no shared
//! cursor. The first failing pair aborts the run.

use std::collections::{BTreeSet, HashSet};
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use crate::aggregator::SeriesAggregator;
use crate::error::{MatrixError, MatrixResult};
use crate::matrix::{AnomalyMatrix, CellResult};
use crate::metric::{Metric, MetricId, Polarity};
use crate::provider::{FetchRequest, Granularity, TimeSeriesProvider};
use crate::registry::PolarityRegistry;
use crate::segment::{Segment, SegmentFilter, SegmentList};
use crate::window::ReportWindow;

/// Default number of in-flight provider calls (sequential).
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 1;

/// Builds an [`AnomalyMatrix`] from a provider.
#[derive(Clone, Debug)]
pub struct MatrixBuilder {
    registry: PolarityRegistry,
    window: ReportWindow,
    include_weekends: bool,
    max_concurrent_requests: usize,
    provider_timeout: Option<Duration>,
}

/// Per-run state shared by every pair.
struct PairContext<'a, P: ?Sized> {
    base: &'a SegmentFilter,
    provider: &'a P,
    metric_ids: &'a BTreeSet<MetricId>,
    polarities: &'a [(MetricId, Polarity)],
    aggregator: SeriesAggregator,
}

impl MatrixBuilder {
    pub fn new(registry: PolarityRegistry, window: ReportWindow, include_weekends: bool) -> Self {
        Self {
            registry,
            window,
            include_weekends,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            provider_timeout: None,
        }
    }

    /// Allow up to `n` provider calls in flight (minimum 1).
    pub fn with_max_concurrent_requests(mut self, n: usize) -> Self {
        self.max_concurrent_requests = n.max(1);
        self
    }

    /// Fail a pair whose provider call exceeds `timeout`.
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = Some(timeout);
        self
    }

    pub fn window(&self) -> &ReportWindow {
        &self.window
    }

    /// Build the full matrix for `segments_a × segments_b × metrics`.
    #[instrument(
        skip_all,
        fields(
            segments_a = segments_a.len(),
            segments_b = segments_b.len(),
            metrics = metrics.len(),
            base = %base
        )
    )]
    pub async fn build<P>(
        &self,
        segments_a: &SegmentList,
        segments_b: &SegmentList,
        metrics: &[Metric],
        base: &SegmentFilter,
        provider: &P,
    ) -> MatrixResult<AnomalyMatrix>
    where
        P: TimeSeriesProvider + ?Sized,
    {
        let polarities = self.validate(segments_a, segments_b, metrics)?;
        let metric_ids: BTreeSet<MetricId> = metrics.iter().map(|m| m.id.clone()).collect();

        let ctx = PairContext {
            base,
            provider,
            metric_ids: &metric_ids,
            polarities: &polarities,
            aggregator: SeriesAggregator::new(self.window.assessment(), self.include_weekends),
        };

        let pairs: Vec<(&Segment, &Segment)> = segments_a
            .iter()
            .flat_map(|a| segments_b.iter().map(move |b| (a, b)))
            .collect();

        info!(
            pairs = pairs.len(),
            concurrency = self.max_concurrent_requests,
            fetch_start = %self.window.fetch_start(),
            fetch_end = %self.window.fetch_end(),
            "building anomaly matrix"
        );

        let per_pair: Vec<Vec<CellResult>> = stream::iter(pairs)
            .map(|(a, b)| self.assess_pair(&ctx, a, b))
            .buffer_unordered(self.max_concurrent_requests)
            .try_collect()
            .await?;

        let cells: Vec<CellResult> = per_pair.into_iter().flatten().collect();
        let matrix = AnomalyMatrix::from_cells(
            segments_a.clone(),
            segments_b.clone(),
            metrics.to_vec(),
            cells,
        )?;

        info!(cells = matrix.len(), "anomaly matrix built");
        Ok(matrix)
    }

    /// Check the run's configuration before any provider call.
    fn validate(
        &self,
        segments_a: &SegmentList,
        segments_b: &SegmentList,
        metrics: &[Metric],
    ) -> MatrixResult<Vec<(MetricId, Polarity)>> {
        if segments_a.is_empty() {
            return Err(MatrixError::config("segments_a", "segment list is empty"));
        }
        if segments_b.is_empty() {
            return Err(MatrixError::config("segments_b", "segment list is empty"));
        }
        if metrics.is_empty() {
            return Err(MatrixError::config("metrics", "metric list is empty"));
        }

        let mut seen = HashSet::new();
        let mut polarities = Vec::with_capacity(metrics.len());
        for metric in metrics {
            if !seen.insert(&metric.id) {
                return Err(MatrixError::config(
                    "metrics",
                    format!("duplicate metric id `{}`", metric.id),
                ));
            }
            polarities.push((metric.id.clone(), self.registry.polarity(&metric.id)?));
        }
        Ok(polarities)
    }

    /// Fetch one pair's series and aggregate every metric.
    async fn assess_pair<P>(
        &self,
        ctx: &PairContext<'_, P>,
        a: &Segment,
        b: &Segment,
    ) -> MatrixResult<Vec<CellResult>>
    where
        P: TimeSeriesProvider + ?Sized,
    {
        let request = FetchRequest {
            segment_filter: SegmentFilter::for_cell(ctx.base, a, b),
            metric_ids: ctx.metric_ids.clone(),
            window_start: self.window.fetch_start(),
            window_end: self.window.fetch_end(),
            granularity: Granularity::Day,
        };
        debug!(segment_a = %a.id, segment_b = %b.id, filter = %request.segment_filter, "fetching pair");

        let fetched = match self.provider_timeout {
            Some(limit) => tokio::time::timeout(limit, ctx.provider.fetch(&request))
                .await
                .map_err(|_| MatrixError::ProviderTimeout {
                    segment_a: a.id.to_string(),
                    segment_b: b.id.to_string(),
                    timeout: limit,
                })?,
            None => ctx.provider.fetch(&request).await,
        };
        let response = fetched.map_err(|e| MatrixError::Provider {
            segment_a: a.id.to_string(),
            segment_b: b.id.to_string(),
            detail: e.to_string(),
        })?;

        let mut cells = Vec::with_capacity(ctx.polarities.len());
        for (metric, polarity) in ctx.polarities {
            let records = response.get(metric).ok_or_else(|| MatrixError::MissingSeries {
                segment_a: a.id.to_string(),
                segment_b: b.id.to_string(),
                metric: metric.to_string(),
            })?;

            let counts = ctx.aggregator.aggregate(metric, *polarity, records);
            debug!(
                segment_a = %a.id,
                segment_b = %b.id,
                metric = %metric,
                good = counts.good,
                bad = counts.bad,
                data_gaps = counts.data_gaps,
                "cell aggregated"
            );
            cells.push(CellResult::new(a.id.clone(), b.id.clone(), metric.clone(), &counts));
        }

        Ok(cells)
    }
}
