//! Placing unseen records into an existing clustering.
//!
//! A new vector is scaled with the session's own scaler and compared against
//! core points only. It takes the label of the nearest core point when that
//! point lies within `eps`, and is noise otherwise. Nothing is re-clustered.

use super::dbscan::validate_eps;
use super::session::ClusteringSession;
use crate::error::Result;
use crate::metrics::euclidean_distance;
use crate::preprocessing::StandardScaler;
use crate::{Label, Matrix, NOISE};
use ndarray::{ArrayView1, Axis};
use serde::Serialize;
use tracing::{debug, warn};

/// Result of placing one vector.
///
/// Serializes as `{"cluster": .., "dist": ..}`; an infinite distance becomes
/// `null` in JSON.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Assignment {
    /// Cluster of the nearest core point, or `NOISE`.
    pub cluster: Label,
    /// Scaled distance to the nearest core point; infinite when there is none.
    #[serde(rename = "dist")]
    pub distance: f64,
}

impl Assignment {
    pub fn is_noise(&self) -> bool {
        self.cluster == NOISE
    }
}

/// Nearest core point by scaled distance. Ties go to the earliest core index.
fn nearest_core(
    scaled: &Matrix,
    labels: &[Label],
    core_points: &[usize],
    eps: f64,
    point: &ArrayView1<f64>,
) -> Assignment {
    let mut best: Option<usize> = None;
    let mut best_distance = f64::INFINITY;

    for &idx in core_points {
        if idx >= scaled.nrows() {
            continue;
        }
        let d = euclidean_distance(&scaled.row(idx), point);
        if d < best_distance {
            best_distance = d;
            best = Some(idx);
        }
    }

    let cluster = match best {
        Some(idx) if best_distance <= eps => labels.get(idx).copied().unwrap_or(NOISE),
        _ => NOISE,
    };
    debug!(nearest = ?best, distance = best_distance, cluster, "assigned point");

    Assignment {
        cluster,
        distance: best_distance,
    }
}

impl ClusteringSession {
    /// Place one raw feature vector into this clustering.
    pub fn assign(&self, vector: ArrayView1<f64>) -> Assignment {
        let Some(scaler) = self.scaler() else {
            return Assignment {
                cluster: NOISE,
                distance: f64::INFINITY,
            };
        };
        let scaled = scaler.transform_row(vector);
        nearest_core(
            self.scaled(),
            self.labels(),
            self.core_points(),
            self.eps(),
            &scaled.view(),
        )
    }

    /// Place every row of `x` independently.
    pub fn assign_all(&self, x: &Matrix) -> Vec<Assignment> {
        x.axis_iter(Axis(0)).map(|row| self.assign(row)).collect()
    }
}

/// Place `vector` into a clustering described by its parts.
///
/// Pass the scaler the clustering was built with. Without one a scaler is
/// fitted from `raw`, which need not match the original. Fails only when
/// `eps` is negative or not finite.
pub fn assign(
    raw: &Matrix,
    labels: &[Label],
    core_points: &[usize],
    eps: f64,
    vector: ArrayView1<f64>,
    scaler: Option<&StandardScaler>,
) -> Result<Assignment> {
    validate_eps(eps)?;

    let fitted;
    let scaler = match scaler {
        Some(scaler) => scaler,
        None => {
            warn!(rows = raw.nrows(), "no scaler supplied, fitting a fresh one for assignment");
            fitted = StandardScaler::fit(raw);
            &fitted
        }
    };

    let scaled = scaler.transform(raw);
    let point = scaler.transform_row(vector);
    Ok(nearest_core(&scaled, labels, core_points, eps, &point.view()))
}
