use super::dbscan::core_points;
use crate::preprocessing::StandardScaler;
use crate::{Label, Matrix, NOISE};
use serde::Serialize;
use std::collections::BTreeMap;

/// Point counts of one clustering run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClusterSummary {
    /// Points per label as emitted, `NOISE` included.
    pub counts: BTreeMap<Label, usize>,
    pub n_clusters: usize,
    pub n_noise: usize,
    pub n_core: usize,
}

impl ClusterSummary {
    pub(crate) fn from_labels(labels: &[Label], n_core: usize) -> Self {
        let mut counts = BTreeMap::new();
        for &label in labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        let n_noise = counts.get(&NOISE).copied().unwrap_or(0);
        let n_clusters = counts.keys().filter(|&&l| l >= 0).count();

        Self {
            counts,
            n_clusters,
            n_noise,
            n_core,
        }
    }
}

/// Everything one clustering run produced.
///
/// Immutable once built. A new run yields a new session rather than updating
/// this one, and assignment only reads it.
#[derive(Clone, Debug)]
pub struct ClusteringSession {
    pub(crate) raw: Matrix,
    pub(crate) scaler: Option<StandardScaler>,
    pub(crate) scaled: Matrix,
    pub(crate) labels: Vec<Label>,
    pub(crate) core_points: Vec<usize>,
    pub(crate) eps: f64,
    pub(crate) min_pts: usize,
    pub(crate) summary: ClusterSummary,
}

impl ClusteringSession {
    pub(crate) fn empty(eps: f64, min_pts: usize) -> Self {
        Self {
            raw: Matrix::zeros((0, 0)),
            scaler: None,
            scaled: Matrix::zeros((0, 0)),
            labels: Vec::new(),
            core_points: Vec::new(),
            eps,
            min_pts,
            summary: ClusterSummary::default(),
        }
    }

    /// Input matrix after non-finite cells were zeroed.
    pub fn raw(&self) -> &Matrix {
        &self.raw
    }

    /// `None` only for a session built from an empty matrix.
    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn scaled(&self) -> &Matrix {
        &self.scaled
    }

    /// One label per input row, in row order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Core point indices, ascending.
    pub fn core_points(&self) -> &[usize] {
        &self.core_points
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn min_pts(&self) -> usize {
        self.min_pts
    }

    pub fn summary(&self) -> &ClusterSummary {
        &self.summary
    }

    pub fn n_clusters(&self) -> usize {
        self.summary.n_clusters
    }

    pub fn n_noise(&self) -> usize {
        self.summary.n_noise
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn is_core(&self, idx: usize) -> bool {
        self.core_points.binary_search(&idx).is_ok()
    }

    /// Row indices carrying `label`.
    pub fn cluster_members(&self, label: Label) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Recompute core points from the scaled matrix with a separate full pass.
    pub fn standalone_core_points(&self) -> Vec<usize> {
        core_points(&self.scaled, self.eps, self.min_pts)
    }

    /// Points labeled noise that the standalone pass still considers core.
    ///
    /// Always empty for a consistent session; anything returned here means the
    /// labeling walk and the neighborhood rule disagree.
    pub fn noise_core_conflicts(&self) -> Vec<usize> {
        self.standalone_core_points()
            .into_iter()
            .filter(|&i| self.labels.get(i) == Some(&NOISE))
            .collect()
    }
}
