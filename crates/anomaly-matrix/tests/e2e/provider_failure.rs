//! E2E: provider failures abort the build with no partial matrix.

use std::time::Duration;

use anomaly_matrix::*;
use async_trait::async_trait;

use crate::common::*;

#[tokio::test]
async fn failing_pair_aborts_build() {
    let a = segments("segments_a", &["desktop", "mobile"]);
    let b = segments("segments_b", &["new", "returning"]);
    let metrics = vec![revenue()];
    let base = SegmentFilter::everything();
    let provider = provider_for(
        &a,
        &b,
        &base,
        &MultiMetricSeries::new().with("revenue", revenue_week()),
    );
    provider.fail_on(SegmentFilter::for_ids(&base, &"mobile".into(), &"returning".into()));

    let err = MatrixBuilder::new(PolarityRegistry::from_metrics(&metrics), work_week(), false)
        .with_max_concurrent_requests(2)
        .build(&a, &b, &metrics, &base, &provider)
        .await
        .unwrap_err();

    assert!(err.is_provider());
    let msg = err.to_string();
    assert!(msg.contains("mobile"));
    assert!(msg.contains("returning"));
}

#[tokio::test]
async fn unknown_pair_is_provider_error() {
    let a = segments("segments_a", &["desktop"]);
    let b = segments("segments_b", &["new"]);
    let metrics = vec![revenue()];

    let err = MatrixBuilder::new(PolarityRegistry::from_metrics(&metrics), work_week(), false)
        .build(&a, &b, &metrics, &SegmentFilter::everything(), &InMemoryProvider::new())
        .await
        .unwrap_err();
    assert!(matches!(err, MatrixError::Provider { .. }));
}

#[tokio::test]
async fn configuration_errors_precede_provider_calls() {
    let a = segments("segments_a", &["desktop"]);
    let b = segments("segments_b", &["new"]);
    let metrics = vec![revenue()];
    let base = SegmentFilter::everything();
    let provider = provider_for(
        &a,
        &b,
        &base,
        &MultiMetricSeries::new().with("revenue", revenue_week()),
    );

    let err = MatrixBuilder::new(PolarityRegistry::new(), work_week(), false)
        .build(&a, &b, &metrics, &base, &provider)
        .await
        .unwrap_err();
    assert!(matches!(err, MatrixError::PolarityNotRegistered(_)));
    assert_eq!(provider.call_count(), 0);
}

/// Never answers.
struct StalledProvider;

#[async_trait]
impl TimeSeriesProvider for StalledProvider {
    async fn fetch(&self, _request: &FetchRequest) -> Result<MultiMetricSeries, ProviderError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn stalled_provider_times_out() {
    let a = segments("segments_a", &["desktop"]);
    let b = segments("segments_b", &["new"]);
    let metrics = vec![revenue()];

    let err = MatrixBuilder::new(PolarityRegistry::from_metrics(&metrics), work_week(), false)
        .with_provider_timeout(Duration::from_secs(5))
        .build(&a, &b, &metrics, &SegmentFilter::everything(), &StalledProvider)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MatrixError::ProviderTimeout { timeout, .. } if timeout == Duration::from_secs(5)
    ));
}
