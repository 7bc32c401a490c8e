//! The anomaly matrix: one cell per (segment A, segment B, metric).
//!
//! Built once per run and immutable afterwards. Cells are stored in
//! declared order (A rows, then B columns, then metric order) together
//! with the segment lists and metric definitions the renderer needs.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::aggregator::AnomalyCounts;
use crate::error::{MatrixError, MatrixResult};
use crate::metric::{Metric, MetricId};
use crate::segment::{SegmentId, SegmentList};

// ── Cell ────────────────────────────────────────────────────────────────

/// Unique key of a matrix cell.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub segment_a: SegmentId,
    pub segment_b: SegmentId,
    pub metric: MetricId,
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.segment_a, self.segment_b, self.metric)
    }
}

/// Anomaly counts for one cell. `net == good - bad` always.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellResult {
    pub segment_a: SegmentId,
    pub segment_b: SegmentId,
    pub metric: MetricId,
    pub good: u32,
    pub bad: u32,
    pub net: i64,
}

impl CellResult {
    pub fn new(
        segment_a: SegmentId,
        segment_b: SegmentId,
        metric: MetricId,
        counts: &AnomalyCounts,
    ) -> Self {
        Self {
            segment_a,
            segment_b,
            metric,
            good: counts.good,
            bad: counts.bad,
            net: counts.net(),
        }
    }

    pub fn key(&self) -> CellKey {
        CellKey {
            segment_a: self.segment_a.clone(),
            segment_b: self.segment_b.clone(),
            metric: self.metric.clone(),
        }
    }
}

/// Column totals for one metric across every cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTotals {
    pub good: u64,
    pub bad: u64,
    pub net: i64,
}

// ── Matrix ──────────────────────────────────────────────────────────────

/// Wire form of an [`AnomalyMatrix`]; validated back into one on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatrixParts {
    pub segments_a: SegmentList,
    pub segments_b: SegmentList,
    pub metrics: Vec<Metric>,
    pub cells: Vec<CellResult>,
}

/// Complete, validated cross product of anomaly counts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MatrixParts", into = "MatrixParts")]
pub struct AnomalyMatrix {
    segments_a: SegmentList,
    segments_b: SegmentList,
    metrics: Vec<Metric>,
    cells: Vec<CellResult>,
    index: HashMap<CellKey, usize>,
}

impl AnomalyMatrix {
    /// Assemble a matrix from cells produced in any order.
    ///
    /// Rejects duplicate keys, cells referencing undeclared segments or
    /// metrics, and anything short of the full `|A| * |B| * |metrics|`.
    pub fn from_cells(
        segments_a: SegmentList,
        segments_b: SegmentList,
        metrics: Vec<Metric>,
        cells: Vec<CellResult>,
    ) -> MatrixResult<Self> {
        let metric_pos: HashMap<&MetricId, usize> =
            metrics.iter().enumerate().map(|(i, m)| (&m.id, i)).collect();

        let mut ordered = Vec::with_capacity(cells.len());
        let mut seen = HashSet::with_capacity(cells.len());
        for cell in cells {
            let a = segments_a.get(&cell.segment_a).ok_or_else(|| {
                MatrixError::UnknownCellReference {
                    kind: "segment",
                    id: cell.segment_a.to_string(),
                }
            })?;
            let b = segments_b.get(&cell.segment_b).ok_or_else(|| {
                MatrixError::UnknownCellReference {
                    kind: "segment",
                    id: cell.segment_b.to_string(),
                }
            })?;
            let m = *metric_pos.get(&cell.metric).ok_or_else(|| {
                MatrixError::UnknownCellReference {
                    kind: "metric",
                    id: cell.metric.to_string(),
                }
            })?;

            if !seen.insert(cell.key()) {
                return Err(MatrixError::DuplicateCell {
                    segment_a: cell.segment_a.to_string(),
                    segment_b: cell.segment_b.to_string(),
                    metric: cell.metric.to_string(),
                });
            }
            ordered.push(((a.ordinal, b.ordinal, m), cell));
        }

        let expected = segments_a.len() * segments_b.len() * metrics.len();
        if ordered.len() != expected {
            return Err(MatrixError::IncompleteMatrix {
                expected,
                actual: ordered.len(),
            });
        }

        ordered.sort_by_key(|(pos, _)| *pos);
        let cells: Vec<CellResult> = ordered.into_iter().map(|(_, cell)| cell).collect();
        let index = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (cell.key(), i))
            .collect();

        Ok(Self {
            segments_a,
            segments_b,
            metrics,
            cells,
            index,
        })
    }

    /// Look up one cell.
    pub fn get(
        &self,
        segment_a: &SegmentId,
        segment_b: &SegmentId,
        metric: &MetricId,
    ) -> Option<&CellResult> {
        let key = CellKey {
            segment_a: segment_a.clone(),
            segment_b: segment_b.clone(),
            metric: metric.clone(),
        };
        self.index.get(&key).map(|&i| &self.cells[i])
    }

    /// All cells in row-major declared order.
    pub fn cells(&self) -> &[CellResult] {
        &self.cells
    }

    /// Cells of one metric, row-major.
    pub fn cells_for_metric<'a>(
        &'a self,
        metric: &'a MetricId,
    ) -> impl Iterator<Item = &'a CellResult> + 'a {
        self.cells.iter().filter(move |c| &c.metric == metric)
    }

    /// Sum of good/bad/net over every cell of one metric.
    pub fn totals_for_metric(&self, metric: &MetricId) -> MetricTotals {
        self.cells_for_metric(metric)
            .fold(MetricTotals::default(), |mut acc, c| {
                acc.good += u64::from(c.good);
                acc.bad += u64::from(c.bad);
                acc.net += c.net;
                acc
            })
    }

    pub fn segments_a(&self) -> &SegmentList {
        &self.segments_a
    }

    pub fn segments_b(&self) -> &SegmentList {
        &self.segments_b
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl TryFrom<MatrixParts> for AnomalyMatrix {
    type Error = MatrixError;

    fn try_from(parts: MatrixParts) -> Result<Self, Self::Error> {
        for cell in &parts.cells {
            if cell.net != i64::from(cell.good) - i64::from(cell.bad) {
                return Err(MatrixError::PersistenceError(format!(
                    "cell {} has net {} but good {} and bad {}",
                    cell.key(),
                    cell.net,
                    cell.good,
                    cell.bad
                )));
            }
        }
        AnomalyMatrix::from_cells(parts.segments_a, parts.segments_b, parts.metrics, parts.cells)
    }
}

impl From<AnomalyMatrix> for MatrixParts {
    fn from(matrix: AnomalyMatrix) -> Self {
        MatrixParts {
            segments_a: matrix.segments_a,
            segments_b: matrix.segments_b,
            metrics: matrix.metrics,
            cells: matrix.cells,
        }
    }
}
