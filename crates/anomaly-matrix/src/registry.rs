//! Metric polarity lookup.
//!
//! Adding a metric only requires a registry entry; the classifier never
//! branches on metric identity.

use std::collections::HashMap;

use crate::error::{MatrixError, MatrixResult};
use crate::metric::{Metric, MetricId, Polarity};

/// Maps each metric to its polarity.
#[derive(Clone, Debug, Default)]
pub struct PolarityRegistry {
    entries: HashMap<MetricId, Polarity>,
}

impl PolarityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured metric definitions.
    pub fn from_metrics<'a>(metrics: impl IntoIterator<Item = &'a Metric>) -> Self {
        let mut registry = Self::new();
        for metric in metrics {
            registry.register(metric.id.clone(), metric.polarity);
        }
        registry
    }

    /// Register (or replace) the polarity of a metric.
    pub fn register(&mut self, id: MetricId, polarity: Polarity) {
        self.entries.insert(id, polarity);
    }

    /// Look up a metric's polarity.
    ///
    /// An unregistered metric is a fatal configuration error.
    pub fn polarity(&self, id: &MetricId) -> MatrixResult<Polarity> {
        self.entries
            .get(id)
            .copied()
            .ok_or_else(|| MatrixError::PolarityNotRegistered(id.to_string()))
    }

    /// Fail on the first metric without a registered polarity.
    pub fn ensure_registered<'a>(
        &self,
        metrics: impl IntoIterator<Item = &'a MetricId>,
    ) -> MatrixResult<()> {
        for id in metrics {
            self.polarity(id)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
