//! Matrix snapshots: save a built matrix and reuse it on the next run.
//!
//! A snapshot records a fingerprint of the inputs that produced it, so a
//! rerun can tell whether the stored matrix still answers the current
//! configuration before skipping the provider.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{MatrixError, MatrixResult};
use crate::matrix::AnomalyMatrix;
use crate::metric::Metric;
use crate::segment::{SegmentFilter, SegmentList};
use crate::window::ReportWindow;

// ── Fingerprint ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct FingerprintInput<'a> {
    metrics: &'a [Metric],
    segments_a: &'a SegmentList,
    segments_b: &'a SegmentList,
    base: &'a SegmentFilter,
    window: &'a ReportWindow,
    include_weekends: bool,
}

/// BLAKE3 digest (hex) of everything that determines a matrix's contents.
pub fn config_fingerprint(
    metrics: &[Metric],
    segments_a: &SegmentList,
    segments_b: &SegmentList,
    base: &SegmentFilter,
    window: &ReportWindow,
    include_weekends: bool,
) -> MatrixResult<String> {
    let input = FingerprintInput {
        metrics,
        segments_a,
        segments_b,
        base,
        window,
        include_weekends,
    };
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"anomaly-matrix-v1:");
    hasher.update(&serde_json::to_vec(&input)?);
    Ok(hasher.finalize().to_hex().to_string())
}

// ── Snapshot ────────────────────────────────────────────────────────────

/// A persisted matrix plus provenance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    pub run_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub config_fingerprint: String,
    pub matrix: AnomalyMatrix,
}

impl MatrixSnapshot {
    pub fn new(matrix: AnomalyMatrix, config_fingerprint: String) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            config_fingerprint,
            matrix,
        }
    }

    /// Whether this snapshot was built from the given inputs.
    pub fn matches(&self, fingerprint: &str) -> bool {
        self.config_fingerprint == fingerprint
    }
}

/// Storage for matrix snapshots.
pub trait MatrixSnapshotStore {
    fn save(&self, snapshot: &MatrixSnapshot) -> MatrixResult<()>;

    /// `None` if nothing has been saved yet.
    fn load(&self) -> MatrixResult<Option<MatrixSnapshot>>;
}

/// Snapshot stored as a single JSON file.
///
/// Writes go to `.tmp` and are renamed into place.
pub struct JsonFileSnapshot {
    path: PathBuf,
}

impl JsonFileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MatrixSnapshotStore for JsonFileSnapshot {
    fn save(&self, snapshot: &MatrixSnapshot) -> MatrixResult<()> {
        let json = serde_json::to_string_pretty(snapshot).map_err(|e| {
            MatrixError::PersistenceError(format!("serialization failed: {}", e))
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            run_id = %snapshot.run_id,
            cells = snapshot.matrix.len(),
            "matrix snapshot saved"
        );
        Ok(())
    }

    fn load(&self) -> MatrixResult<Option<MatrixSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let snapshot: MatrixSnapshot = serde_json::from_str(&contents).map_err(|e| {
            MatrixError::PersistenceError(format!(
                "deserialization of {} failed: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(Some(snapshot))
    }
}

/// In-memory snapshot store (for testing).
#[derive(Default)]
pub struct InMemorySnapshot {
    data: Mutex<Option<MatrixSnapshot>>,
}

impl InMemorySnapshot {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatrixSnapshotStore for InMemorySnapshot {
    fn save(&self, snapshot: &MatrixSnapshot) -> MatrixResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| MatrixError::PersistenceError("snapshot store poisoned".into()))?;
        *data = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> MatrixResult<Option<MatrixSnapshot>> {
        let data = self
            .data
            .lock()
            .map_err(|_| MatrixError::PersistenceError("snapshot store poisoned".into()))?;
        Ok(data.clone())
    }
}
