//! One report run: reuse a matching snapshot or build and store a new one.

use anomaly_matrix::{
    AnomalyMatrix, MatrixSnapshot, MatrixSnapshotStore, ReportPlan, TimeSeriesProvider,
};
use anyhow::Context;
use tracing::{info, warn};

/// Where the matrix of a run came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Snapshot,
    Built,
}

/// A stored matrix for `fingerprint`, if one exists and reuse is enabled.
pub fn reusable(
    store: &dyn MatrixSnapshotStore,
    fingerprint: &str,
) -> anyhow::Result<Option<AnomalyMatrix>> {
    let Some(snapshot) = store.load().context("loading snapshot")? else {
        info!("no snapshot stored, building");
        return Ok(None);
    };

    if snapshot.matches(fingerprint) {
        info!(run_id = %snapshot.run_id, created_at = %snapshot.created_at, "reusing snapshot");
        Ok(Some(snapshot.matrix))
    } else {
        warn!(
            run_id = %snapshot.run_id,
            "snapshot was built from a different configuration, rebuilding"
        );
        Ok(None)
    }
}

/// Produce the matrix for `plan`, consulting `store` first when `reuse` is set.
pub async fn run<P>(
    plan: &ReportPlan,
    provider: &P,
    store: &dyn MatrixSnapshotStore,
    reuse: bool,
) -> anyhow::Result<(AnomalyMatrix, Origin)>
where
    P: TimeSeriesProvider + ?Sized,
{
    let fingerprint = plan.fingerprint()?;

    if reuse {
        if let Some(matrix) = reusable(store, &fingerprint)? {
            return Ok((matrix, Origin::Snapshot));
        }
    }

    let matrix = plan.run(provider).await.context("building anomaly matrix")?;
    store
        .save(&MatrixSnapshot::new(matrix.clone(), fingerprint))
        .context("saving snapshot")?;
    Ok((matrix, Origin::Built))
}
