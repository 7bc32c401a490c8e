//! E2E: a week of revenue across two row segments and one column segment.

use anomaly_matrix::*;

use crate::common::*;

#[tokio::test]
async fn spike_and_dip_cancel_out() {
    let a = segments("segments_a", &["SegA1", "SegA2"]);
    let b = segments("segments_b", &["SegB1"]);
    let metrics = vec![revenue()];
    let base = SegmentFilter::everything();

    let series = MultiMetricSeries::new().with("revenue", revenue_week());
    let provider = provider_for(&a, &b, &base, &series);

    let builder = MatrixBuilder::new(PolarityRegistry::from_metrics(&metrics), work_week(), false);
    let matrix = builder.build(&a, &b, &metrics, &base, &provider).await.unwrap();

    assert_eq!(matrix.len(), 2);
    for cell in matrix.cells() {
        assert_eq!((cell.good, cell.bad, cell.net), (1, 1, 0), "cell {}", cell.key());
    }

    // Rerun over the same data yields the same matrix.
    let rerun = builder.build(&a, &b, &metrics, &base, &provider).await.unwrap();
    assert_eq!(rerun, matrix);
    assert_eq!(provider.call_count(), 4);
}

#[tokio::test]
async fn trend_days_never_counted() {
    let a = segments("segments_a", &["SegA1"]);
    let b = segments("segments_b", &["SegB1"]);
    let metrics = vec![revenue()];
    let base = SegmentFilter::everything();

    // Wild lookback days before the assessment window.
    let mut records: Vec<DayRecord> = (1..=5)
        .map(|d| {
            let date = chrono::NaiveDate::from_ymd_opt(2024, 5, d + 20).unwrap();
            DayRecord::new(date, 1_000.0, 100.0, 150.0, 50.0)
        })
        .collect();
    records.extend(revenue_week());

    let provider = provider_for(&a, &b, &base, &MultiMetricSeries::new().with("revenue", records));
    let matrix = MatrixBuilder::new(PolarityRegistry::from_metrics(&metrics), work_week(), false)
        .build(&a, &b, &metrics, &base, &provider)
        .await
        .unwrap();

    let cell = matrix
        .get(&"SegA1".into(), &"SegB1".into(), &"revenue".into())
        .unwrap();
    assert_eq!((cell.good, cell.bad, cell.net), (1, 1, 0));
}

#[tokio::test]
async fn weekend_policy_changes_counts_not_data() {
    let a = segments("segments_a", &["SegA1"]);
    let b = segments("segments_b", &["SegB1"]);
    let metrics = vec![revenue()];
    let base = SegmentFilter::everything();

    // Mon 3rd .. Sun 9th, with a Saturday spike.
    let mut records = quiet(3..=9);
    records[5] = DayRecord::new(day(8), 400.0, 100.0, 110.0, 90.0);
    let provider = provider_for(&a, &b, &base, &MultiMetricSeries::new().with("revenue", records));

    let window = ReportWindow::new(AssessmentWindow::new(day(3), day(9)).unwrap(), 35).unwrap();
    let registry = PolarityRegistry::from_metrics(&metrics);
    let (sa, sb, m): (SegmentId, SegmentId, MetricId) =
        ("SegA1".into(), "SegB1".into(), "revenue".into());

    let weekdays = MatrixBuilder::new(registry.clone(), window, false)
        .build(&a, &b, &metrics, &base, &provider)
        .await
        .unwrap();
    assert_eq!(weekdays.get(&sa, &sb, &m).unwrap().good, 0);

    let all_days = MatrixBuilder::new(registry, window, true)
        .build(&a, &b, &metrics, &base, &provider)
        .await
        .unwrap();
    assert_eq!(all_days.get(&sa, &sb, &m).unwrap().good, 1);
}

#[tokio::test]
async fn missing_actuals_count_as_no_anomaly() {
    let a = segments("segments_a", &["SegA1"]);
    let b = segments("segments_b", &["SegB1"]);
    let metrics = vec![revenue()];
    let base = SegmentFilter::everything();

    let mut records = revenue_week();
    records[1].actual = None;
    records[2].actual = Some(f64::NAN);
    let provider = provider_for(&a, &b, &base, &MultiMetricSeries::new().with("revenue", records));

    let matrix = MatrixBuilder::new(PolarityRegistry::from_metrics(&metrics), work_week(), false)
        .build(&a, &b, &metrics, &base, &provider)
        .await
        .unwrap();
    let cell = &matrix.cells()[0];
    assert_eq!((cell.good, cell.bad, cell.net), (0, 0, 0));
}
