//! File-backed time-series provider.
//!
//! The fixture is a JSON object keyed by `"<segment_a>|<segment_b>"`, each
//! value mapping metric ids to day records:
//!
//! ```text
//! {
//!   "desktop|new": {
//!     "revenue": [ { "date": "2024-06-03", "actual": 120.0, "upper": 130.0, "lower": 90.0 } ]
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anomaly_matrix::{
    FetchRequest, InMemoryProvider, MultiMetricSeries, ProviderError, SegmentFilter, SegmentId,
    TimeSeriesProvider,
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;

/// Serves pre-exported series from a JSON file.
pub struct JsonFileProvider {
    inner: InMemoryProvider,
}

impl JsonFileProvider {
    /// Load `path`, composing each pair key with `base`.
    pub fn open(path: &Path, base: &SegmentFilter) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading provider data {}", path.display()))?;
        Self::from_json(&contents, base)
            .with_context(|| format!("parsing provider data {}", path.display()))
    }

    pub fn from_json(json: &str, base: &SegmentFilter) -> anyhow::Result<Self> {
        let pairs: HashMap<String, MultiMetricSeries> = serde_json::from_str(json)?;

        let mut inner = InMemoryProvider::new();
        for (key, series) in pairs {
            let (a, b) = key
                .split_once('|')
                .ok_or_else(|| anyhow!("pair key `{}` is not of the form `a|b`", key))?;
            inner.insert_cell(base, &SegmentId::new(a.trim()), &SegmentId::new(b.trim()), series);
        }

        tracing::debug!(pairs = inner.len(), "provider data loaded");
        Ok(Self { inner })
    }

    pub fn pairs(&self) -> usize {
        self.inner.len()
    }
}

#[async_trait]
impl TimeSeriesProvider for JsonFileProvider {
    async fn fetch(&self, request: &FetchRequest) -> Result<MultiMetricSeries, ProviderError> {
        self.inner.fetch(request).await
    }
}
